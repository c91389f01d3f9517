pub mod criteria;
pub mod flight;
pub mod order;

pub use criteria::{FlightQuery, PassengerCount, SearchCriteria};
pub use flight::{BookingSummary, FlightOption};
pub use order::{CoffeeKind, OrderLine};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Passenger count must be between 1 and 9: {0}")]
    PassengerCountOutOfRange(u8),
}
