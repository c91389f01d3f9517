use std::sync::Arc;

use actman::Runner;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

pub use crate::{
    actors::{booking, orders},
    command::Command,
    config::Config,
};
use crate::{command::handle_command, lookup::FlightLookup};

mod actors;
pub mod command;
pub mod config;
pub mod lookup;
pub mod model;
pub mod totals;
pub mod workflow;

const COMMAND_CHANNEL_SIZE: usize = 100;

pub struct Farebook {
    config: Config,
    command_receiver: mpsc::Receiver<Command>,
}

impl Farebook {
    pub fn new(config: Config) -> Result<(Self, mpsc::Sender<Command>), Error> {
        let (command_sender, command_receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        Ok((
            Self {
                config,
                command_receiver,
            },
            command_sender,
        ))
    }

    pub async fn run(mut self, ready_sender: oneshot::Sender<Result<(), Error>>) {
        info!("Farebook is running...");

        let lookup: Arc<dyn FlightLookup> = match self.config.lookup.build() {
            Ok(catalog) => Arc::new(catalog),
            Err(e) => {
                error!("Failed to create flight lookup: {e:?}");
                let _ = ready_sender
                    .send(Err(e.into()))
                    .inspect_err(|_| error!("Failed to send ready signal"));
                return;
            }
        };

        let mut runner = Runner::new();
        let orders_handle = runner.run(orders::Actor::new());
        let booking_handle = runner.run(booking::Actor::new(lookup));

        let _ = ready_sender
            .send(Ok(()))
            .inspect_err(|_| error!("Failed to send ready signal"));

        loop {
            let Some(cmd) = self.command_receiver.recv().await else {
                info!("All command senders dropped.");
                break;
            };
            debug!("Command received: {:?}", cmd);
            if handle_command(cmd, &booking_handle, &orders_handle).await {
                break;
            }
        }

        runner.shutdown().await;
        info!("Farebook has been shut down.");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] config::Error),
    #[error("Lookup error: {0}")]
    Lookup(#[from] lookup::Error),
    #[error("Workflow error: {0}")]
    Workflow(#[from] workflow::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
