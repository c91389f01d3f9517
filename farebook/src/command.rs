use actman::Handle;
use tracing::debug;

use crate::actors::{booking, orders};

#[derive(Debug)]
pub enum Command {
    Booking(booking::Message),
    Orders(orders::Message),
    Shutdown,
}

/// Routes a command to the actor owning the state it touches.
/// Returns `true` when the runner should shut down.
pub async fn handle_command(
    command: Command,
    booking_handle: &Handle<booking::Actor>,
    orders_handle: &Handle<orders::Actor>,
) -> bool {
    match command {
        Command::Booking(msg) => {
            handle_booking_command(msg, booking_handle).await;
        }
        Command::Orders(msg) => {
            handle_orders_command(msg, orders_handle).await;
        }
        Command::Shutdown => {
            // Should shutdown
            return true;
        }
    }

    // Should not shutdown
    false
}

async fn handle_booking_command(msg: booking::Message, booking_handle: &Handle<booking::Actor>) {
    debug!("Forwarding booking command: {msg:?}");
    booking_handle.send(msg).await;
}

async fn handle_orders_command(msg: orders::Message, orders_handle: &Handle<orders::Actor>) {
    debug!("Forwarding orders command: {msg:?}");
    orders_handle.send(msg).await;
}
