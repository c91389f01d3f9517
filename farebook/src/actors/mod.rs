pub mod booking;
pub mod orders;
