use std::fmt::{self, Debug, Formatter};

use actman::Control;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::{
    model::{CoffeeKind, OrderLine},
    totals::OrderTotals,
};

pub struct Actor {
    orders: OrderTotals,
}

#[async_trait::async_trait]
impl actman::Actor for Actor {
    type Message = Message;

    async fn run(mut self, mut state: actman::State<Self>) {
        loop {
            tokio::select! {
                message = state.message_receiver.recv() => {
                    let Some(message) = message else {
                        warn!("All orders handles dropped, terminating orders actor.");
                        break;
                    };
                    self.handle_message(message);
                }
                Some(ctrl) = state.control_receiver.recv() => {
                    match ctrl {
                        Control::Shutdown => {
                            info!("Orders actor received shutdown control.");
                            break;
                        },
                    }
                }
                else => {
                    warn!("All channels closed, terminating orders actor.");
                    break;
                }
            }
        }

        info!("Orders actor shut down with {} lines.", self.orders.lines().len());
    }
}

impl Actor {
    pub fn new() -> Self {
        Self {
            orders: OrderTotals::new(),
        }
    }

    fn handle_message(&mut self, message: Message) {
        debug!("Orders message: {message:?}");
        match message {
            Message::Add {
                kind,
                price,
                quantity,
            } => {
                self.orders.add_order(kind, price, quantity);
                info!("Order added: {quantity} x {kind} @ {price}");
            }
            Message::List { reply_sender } => {
                let _ = reply_sender
                    .send(self.orders.lines().to_vec())
                    .inspect_err(|_| error!("Failed to send reply"));
            }
            Message::Total { reply_sender } => {
                let _ = reply_sender
                    .send(self.orders.total())
                    .inspect_err(|_| error!("Failed to send reply"));
            }
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

pub enum Message {
    Add {
        kind: CoffeeKind,
        price: f64,
        quantity: u32,
    },
    List {
        reply_sender: oneshot::Sender<Vec<OrderLine>>,
    },
    Total {
        reply_sender: oneshot::Sender<f64>,
    },
}

impl Debug for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add {
                kind,
                price,
                quantity,
            } => f
                .debug_struct("Add")
                .field("kind", kind)
                .field("price", price)
                .field("quantity", quantity)
                .finish(),
            Self::List { .. } => f.debug_tuple("List").finish(),
            Self::Total { .. } => f.debug_tuple("Total").finish(),
        }
    }
}
