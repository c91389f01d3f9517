use std::fmt::{self, Debug, Formatter};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::workflow::{self, RequestToken, Resolution, WorkflowSnapshot};

pub enum Message {
    SetDestination(String),
    SetDeparture(String),
    SetArrival(String),
    SetPassengerCount {
        count: u8,
        reply_sender: oneshot::Sender<Result<(), workflow::Error>>,
    },
    SetRoundtrip(bool),
    /// Replies once this submit's lookup has come back, whether or not its
    /// outcome was applied.
    Submit {
        reply_sender: oneshot::Sender<Result<SubmitReply, workflow::Error>>,
    },
    SelectFlight(String),
    Snapshot {
        reply_sender: oneshot::Sender<WorkflowSnapshot>,
    },
}

impl Debug for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetDestination(v) => f.debug_tuple("SetDestination").field(v).finish(),
            Self::SetDeparture(v) => f.debug_tuple("SetDeparture").field(v).finish(),
            Self::SetArrival(v) => f.debug_tuple("SetArrival").field(v).finish(),
            Self::SetPassengerCount { count, .. } => {
                f.debug_tuple("SetPassengerCount").field(count).finish()
            }
            Self::SetRoundtrip(v) => f.debug_tuple("SetRoundtrip").field(v).finish(),
            Self::Submit { .. } => f.debug_tuple("Submit").finish(),
            Self::SelectFlight(v) => f.debug_tuple("SelectFlight").field(v).finish(),
            Self::Snapshot { .. } => f.debug_tuple("Snapshot").finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReply {
    pub token: RequestToken,
    pub resolution: Resolution,
}

impl Message {
    pub fn submit() -> (Self, oneshot::Receiver<Result<SubmitReply, workflow::Error>>) {
        let (reply_sender, reply_receiver) = oneshot::channel();
        (Self::Submit { reply_sender }, reply_receiver)
    }

    pub fn snapshot() -> (Self, oneshot::Receiver<WorkflowSnapshot>) {
        let (reply_sender, reply_receiver) = oneshot::channel();
        (Self::Snapshot { reply_sender }, reply_receiver)
    }

    pub fn set_passenger_count(
        count: u8,
    ) -> (Self, oneshot::Receiver<Result<(), workflow::Error>>) {
        let (reply_sender, reply_receiver) = oneshot::channel();
        (
            Self::SetPassengerCount {
                count,
                reply_sender,
            },
            reply_receiver,
        )
    }
}
