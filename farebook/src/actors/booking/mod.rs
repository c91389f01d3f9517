pub mod message;

use std::{collections::HashMap, sync::Arc};

use actman::Control;
pub use message::{Message, SubmitReply};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::{
    lookup::{self, FlightLookup},
    model::FlightOption,
    workflow::{self, FlightSearchWorkflow, RequestToken, SearchTicket},
};

const OUTCOME_CHANNEL_SIZE: usize = 32;

type Outcome = (RequestToken, Result<Vec<FlightOption>, lookup::Error>);

/// Owns one [`FlightSearchWorkflow`] and runs its lookups.
///
/// Every submit gets its own task, so a slow lookup never blocks the form.
/// Outcomes come back through a channel and are fed to the workflow, which
/// only applies the one matching the latest token.
pub struct Actor {
    workflow: FlightSearchWorkflow,
    lookup: Arc<dyn FlightLookup>,
    outcome_sender: mpsc::Sender<Outcome>,
    outcome_receiver: mpsc::Receiver<Outcome>,
    pending: HashMap<RequestToken, oneshot::Sender<Result<SubmitReply, workflow::Error>>>,
}

#[async_trait::async_trait]
impl actman::Actor for Actor {
    type Message = Message;

    async fn run(mut self, mut state: actman::State<Self>) {
        loop {
            tokio::select! {
                message = state.message_receiver.recv() => {
                    let Some(message) = message else {
                        warn!("All booking handles dropped, terminating booking actor.");
                        break;
                    };
                    self.handle_message(message);
                }
                Some((token, outcome)) = self.outcome_receiver.recv() => {
                    self.handle_outcome(token, outcome);
                }
                Some(ctrl) = state.control_receiver.recv() => {
                    match ctrl {
                        Control::Shutdown => {
                            info!("Booking actor received shutdown control.");
                            break;
                        },
                    }
                }
                else => {
                    warn!("All channels closed, terminating booking actor.");
                    break;
                }
            }
        }

        self.shutdown();
    }
}

impl Actor {
    pub fn new(lookup: Arc<dyn FlightLookup>) -> Self {
        Self::with_workflow(FlightSearchWorkflow::new(), lookup)
    }

    pub fn with_workflow(workflow: FlightSearchWorkflow, lookup: Arc<dyn FlightLookup>) -> Self {
        let (outcome_sender, outcome_receiver) = mpsc::channel(OUTCOME_CHANNEL_SIZE);
        Self {
            workflow,
            lookup,
            outcome_sender,
            outcome_receiver,
            pending: HashMap::new(),
        }
    }

    fn shutdown(&mut self) {
        self.workflow.dispose();
        // Dropping the pending senders closes the submitters' reply channels.
        if !self.pending.is_empty() {
            info!(
                "Abandoning {} in-flight searches on shutdown",
                self.pending.len()
            );
        }
        self.pending.clear();
        self.outcome_receiver.close();
        info!("Booking actor shut down.");
    }

    fn handle_message(&mut self, message: Message) {
        debug!("Booking message: {message:?}");
        match message {
            Message::SetDestination(destination) => self.workflow.set_destination(destination),
            Message::SetDeparture(departure) => self.workflow.set_departure(departure),
            Message::SetArrival(arrival) => self.workflow.set_arrival(arrival),
            Message::SetPassengerCount {
                count,
                reply_sender,
            } => {
                let _ = reply_sender
                    .send(
                        self.workflow
                            .set_passenger_count(count)
                            .inspect_err(|e| error!("Failed to set passenger count: {e}")),
                    )
                    .inspect_err(|_| error!("Failed to send reply"));
            }
            Message::SetRoundtrip(is_roundtrip) => self.workflow.set_roundtrip(is_roundtrip),
            Message::Submit { reply_sender } => self.handle_submit_message(reply_sender),
            Message::SelectFlight(id) => self.workflow.select_flight(id),
            Message::Snapshot { reply_sender } => {
                let _ = reply_sender
                    .send(self.workflow.snapshot())
                    .inspect_err(|_| error!("Failed to send reply"));
            }
        }
    }

    fn handle_submit_message(
        &mut self,
        reply_sender: oneshot::Sender<Result<SubmitReply, workflow::Error>>,
    ) {
        let SearchTicket { token, query } = match self.workflow.begin_submit() {
            Ok(ticket) => ticket,
            Err(e) => {
                error!("Failed to submit search: {e}");
                let _ = reply_sender
                    .send(Err(e))
                    .inspect_err(|_| error!("Failed to send reply"));
                return;
            }
        };
        self.pending.insert(token, reply_sender);

        let lookup = self.lookup.clone();
        let outcome_sender = self.outcome_sender.clone();
        tokio::spawn(async move {
            // A panicking lookup still has to resolve the search.
            let outcome = match tokio::spawn(async move { lookup.fetch_options(&query).await })
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Lookup task of search {token} failed: {e}");
                    Err(lookup::Error::Unavailable(format!("lookup task failed: {e}")))
                }
            };
            if outcome_sender.send((token, outcome)).await.is_err() {
                debug!("Booking actor is gone. Dropping outcome of search {token}");
            }
        });
    }

    fn handle_outcome(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<FlightOption>, lookup::Error>,
    ) {
        let resolution = self.workflow.resolve(token, outcome);
        let Some(reply_sender) = self.pending.remove(&token) else {
            warn!("No submitter waiting for search {token}");
            return;
        };
        let _ = reply_sender
            .send(Ok(SubmitReply { token, resolution }))
            .inspect_err(|_| debug!("Submitter of search {token} stopped waiting"));
    }
}
