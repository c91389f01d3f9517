mod status;

use serde::{Deserialize, Serialize};
pub use status::{RequestStatus, RequestToken, Resolution};
use tracing::{debug, info, warn};

use crate::{
    lookup::{self, FlightLookup},
    model::{self, BookingSummary, FlightOption, FlightQuery, PassengerCount, SearchCriteria},
};

pub const SEARCH_ERROR_MESSAGE: &str =
    "An error occurred while searching for flights. Please try again.";

/// State of one flight booking session: criteria, request status, the latest
/// options and the user's pick among them.
///
/// Nothing here is tied to a runtime. Submitting is split into
/// [`begin_submit`](Self::begin_submit) and [`resolve`](Self::resolve) so the
/// lookup can run anywhere, and only the outcome of the most recent submit is
/// ever applied.
#[derive(Debug, Clone, Default)]
pub struct FlightSearchWorkflow {
    criteria: SearchCriteria,
    status: RequestStatus,
    options: Vec<FlightOption>,
    selected_id: Option<String>,
    latest_token: RequestToken,
    /// Token of the submit still waiting for its outcome, if any.
    pending_token: Option<RequestToken>,
    disposed: bool,
}

/// Issued by [`FlightSearchWorkflow::begin_submit`]. Hand the outcome of
/// looking up `query` back together with `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub token: RequestToken,
    pub query: FlightQuery,
}

impl FlightSearchWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn options(&self) -> &[FlightOption] {
        &self.options
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.status == RequestStatus::Submitting
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.criteria = std::mem::take(&mut self.criteria).with_destination(destination);
    }

    pub fn set_departure(&mut self, departure_date: impl Into<String>) {
        self.criteria = std::mem::take(&mut self.criteria).with_departure_date(departure_date);
    }

    pub fn set_arrival(&mut self, return_date: impl Into<String>) {
        self.criteria = std::mem::take(&mut self.criteria).with_return_date(return_date);
    }

    /// Fails without touching the criteria when `count` is outside `1..=9`.
    pub fn set_passenger_count(&mut self, count: u8) -> Result<(), Error> {
        let passengers = PassengerCount::try_from(count)?;
        self.criteria = std::mem::take(&mut self.criteria).with_passengers(passengers);
        Ok(())
    }

    /// Turning roundtrip off keeps the stored return date; it just stops
    /// being sent or required.
    pub fn set_roundtrip(&mut self, is_roundtrip: bool) {
        self.criteria = std::mem::take(&mut self.criteria).with_roundtrip(is_roundtrip);
    }

    /// Moves to `Submitting` and issues a fresh token.
    ///
    /// Options and selection from earlier searches stay visible until the new
    /// outcome is resolved. A submit that is still in flight is not cancelled;
    /// its outcome will simply resolve as [`Resolution::Stale`].
    pub fn begin_submit(&mut self) -> Result<SearchTicket, Error> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        if self.is_submitting() {
            debug!("Submitting again while {} is in flight", self.latest_token);
        }

        self.latest_token = self.latest_token.next();
        self.pending_token = Some(self.latest_token);
        self.status = RequestStatus::Submitting;
        info!(
            "Search {} submitted for {}",
            self.latest_token, self.criteria.destination
        );

        Ok(SearchTicket {
            token: self.latest_token,
            query: self.criteria.to_query(),
        })
    }

    /// Applies a lookup outcome if it belongs to the latest submit and that
    /// submit has not been resolved yet. Anything else is [`Resolution::Stale`].
    ///
    /// Lookup errors are absorbed here: they turn into `RequestStatus::Error`
    /// and never reach the caller. Options held before a failed search are kept.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<FlightOption>, lookup::Error>,
    ) -> Resolution {
        if self.disposed {
            debug!("Dropping outcome of search {token}: workflow disposed");
            return Resolution::Disposed;
        }
        if self.pending_token != Some(token) {
            debug!(
                "Dropping outcome of search {token}: latest is {} (pending: {:?})",
                self.latest_token, self.pending_token
            );
            return Resolution::Stale;
        }
        self.pending_token = None;

        match outcome {
            Ok(options) => {
                info!("Search {token} returned {} options", options.len());
                self.options = options;
                self.status = RequestStatus::Submitted;
            }
            Err(e) => {
                warn!("Search {token} failed: {e}");
                self.status = RequestStatus::Error;
            }
        }
        Resolution::Applied(self.status)
    }

    /// Runs one whole submit against `lookup` in place.
    pub async fn submit<L>(&mut self, lookup: &L) -> Result<Resolution, Error>
    where
        L: FlightLookup + ?Sized,
    {
        let SearchTicket { token, query } = self.begin_submit()?;
        let outcome = lookup.fetch_options(&query).await;
        Ok(self.resolve(token, outcome))
    }

    /// Records the pick as is. Ids that match nothing are accepted and simply
    /// yield no selection.
    pub fn select_flight(&mut self, id: impl Into<String>) {
        self.selected_id = Some(id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn current_selection(&self) -> Option<&FlightOption> {
        let selected_id = self.selected_id.as_deref()?;
        self.options.iter().find(|option| option.id == selected_id)
    }

    pub fn summary(&self) -> Option<BookingSummary> {
        self.current_selection()
            .map(|option| BookingSummary::new(option, self.criteria.passengers))
    }

    pub fn total_price(&self) -> Option<f64> {
        self.summary().map(|summary| summary.total_price)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        (self.status == RequestStatus::Error).then_some(SEARCH_ERROR_MESSAGE)
    }

    /// Ends the session. Outcomes that arrive afterwards are discarded.
    pub fn dispose(&mut self) {
        if !self.disposed {
            info!("Workflow disposed at search {}", self.latest_token);
        }
        self.disposed = true;
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            criteria: self.criteria.clone(),
            status: self.status,
            options: self.options.clone(),
            selected_id: self.selected_id.clone(),
            selection: self.current_selection().cloned(),
            summary: self.summary(),
            error_message: self.error_message().map(str::to_string),
        }
    }
}

/// Read-only view of a workflow for whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub criteria: SearchCriteria,
    pub status: RequestStatus,
    pub options: Vec<FlightOption>,
    pub selected_id: Option<String>,
    pub selection: Option<FlightOption>,
    pub summary: Option<BookingSummary>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Workflow has been disposed")]
    Disposed,
    #[error("Model error: {0}")]
    Model(#[from] model::Error),
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn option(id: &str, airline: &str, price: f64, duration: &str) -> FlightOption {
        FlightOption {
            id: id.into(),
            airline: airline.into(),
            price,
            duration_label: duration.into(),
        }
    }

    fn lax_workflow() -> FlightSearchWorkflow {
        let mut workflow = FlightSearchWorkflow::new();
        workflow.set_destination("LAX");
        workflow.set_departure("2024-06-01");
        workflow.set_roundtrip(false);
        workflow.set_passenger_count(2).unwrap();
        workflow
    }

    /// Hands out queued outcomes in order and remembers every query.
    struct ScriptedLookup {
        outcomes: Mutex<Vec<Result<Vec<FlightOption>, lookup::Error>>>,
        queries: Mutex<Vec<FlightQuery>>,
    }

    impl ScriptedLookup {
        fn new(outcomes: Vec<Result<Vec<FlightOption>, lookup::Error>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().rev().collect()),
                queries: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait::async_trait]
    impl FlightLookup for ScriptedLookup {
        async fn fetch_options(
            &self,
            query: &FlightQuery,
        ) -> Result<Vec<FlightOption>, lookup::Error> {
            self.queries.lock().unwrap().push(query.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .expect("no scripted outcome left")
        }
    }

    #[test]
    fn new_workflow_is_idle() {
        let workflow = FlightSearchWorkflow::new();
        assert_eq!(workflow.status(), RequestStatus::Idle);
        assert!(workflow.options().is_empty());
        assert_eq!(workflow.current_selection(), None);
        assert_eq!(workflow.summary(), None);
        assert_eq!(workflow.error_message(), None);
        assert_eq!(workflow.criteria().passengers.get(), 1);
    }

    #[test]
    fn setters_change_one_field() {
        let mut workflow = lax_workflow();
        let before = workflow.criteria().clone();

        workflow.set_arrival("2024-06-09");
        assert_eq!(
            workflow.criteria(),
            &SearchCriteria {
                return_date: "2024-06-09".into(),
                ..before.clone()
            }
        );

        let before = workflow.criteria().clone();
        workflow.set_roundtrip(true);
        assert_eq!(
            workflow.criteria(),
            &SearchCriteria {
                is_roundtrip: true,
                ..before
            }
        );
    }

    #[test]
    fn out_of_range_passenger_count_is_rejected() {
        let mut workflow = lax_workflow();
        assert_eq!(
            workflow.set_passenger_count(0),
            Err(Error::Model(model::Error::PassengerCountOutOfRange(0)))
        );
        assert!(workflow.set_passenger_count(10).is_err());
        assert_eq!(workflow.criteria().passengers.get(), 2);
    }

    #[test]
    fn begin_submit_issues_increasing_tokens() {
        let mut workflow = lax_workflow();
        let first = workflow.begin_submit().unwrap();
        assert_eq!(workflow.status(), RequestStatus::Submitting);
        assert!(workflow.is_submitting());
        assert_eq!(first.query.destination, "LAX");
        assert_eq!(first.query.arrival, None);

        let second = workflow.begin_submit().unwrap();
        assert!(second.token > first.token);
    }

    #[test]
    fn success_replaces_options_in_order() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        let options = vec![
            option("b", "Beta", 80.0, "3h"),
            option("a", "Alpha", 120.0, "2h"),
        ];
        assert_eq!(
            workflow.resolve(ticket.token, Ok(options.clone())),
            Resolution::Applied(RequestStatus::Submitted)
        );
        assert_eq!(workflow.options(), options.as_slice());

        let ticket = workflow.begin_submit().unwrap();
        let replacement = vec![option("c", "Gamma", 99.0, "1h")];
        workflow.resolve(ticket.token, Ok(replacement.clone()));
        assert_eq!(workflow.options(), replacement.as_slice());
    }

    #[test]
    fn empty_result_is_a_success() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        assert_eq!(
            workflow.resolve(ticket.token, Ok(vec![])),
            Resolution::Applied(RequestStatus::Submitted)
        );
        assert!(workflow.options().is_empty());
        assert_eq!(workflow.error_message(), None);
    }

    #[test]
    fn any_failure_becomes_error_status() {
        for err in [
            lookup::Error::InvalidQuery("destination is required".into()),
            lookup::Error::Unavailable("timeout".into()),
        ] {
            let mut workflow = lax_workflow();
            let ticket = workflow.begin_submit().unwrap();
            assert_eq!(
                workflow.resolve(ticket.token, Err(err)),
                Resolution::Applied(RequestStatus::Error)
            );
            assert_eq!(workflow.error_message(), Some(SEARCH_ERROR_MESSAGE));
        }
    }

    #[test]
    fn failure_keeps_previous_options_and_retry_recovers() {
        let mut workflow = lax_workflow();
        let options = vec![option("f1", "Acme", 100.0, "2h")];
        let ticket = workflow.begin_submit().unwrap();
        workflow.resolve(ticket.token, Ok(options.clone()));

        let ticket = workflow.begin_submit().unwrap();
        workflow.resolve(ticket.token, Err(lookup::Error::Unavailable("down".into())));
        assert_eq!(workflow.status(), RequestStatus::Error);
        assert_eq!(workflow.options(), options.as_slice());

        let ticket = workflow.begin_submit().unwrap();
        assert_eq!(workflow.status(), RequestStatus::Submitting);
        workflow.resolve(ticket.token, Ok(vec![]));
        assert_eq!(workflow.status(), RequestStatus::Submitted);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let mut workflow = lax_workflow();
        let first = workflow.begin_submit().unwrap();
        let second = workflow.begin_submit().unwrap();

        let latest = vec![option("new", "Newer", 50.0, "1h")];
        assert_eq!(
            workflow.resolve(second.token, Ok(latest.clone())),
            Resolution::Applied(RequestStatus::Submitted)
        );
        assert_eq!(
            workflow.resolve(first.token, Ok(vec![option("old", "Older", 1.0, "9h")])),
            Resolution::Stale
        );
        assert_eq!(workflow.options(), latest.as_slice());

        // A stale failure must not flip the status either.
        let third = workflow.begin_submit().unwrap();
        let fourth = workflow.begin_submit().unwrap();
        assert_eq!(
            workflow.resolve(third.token, Err(lookup::Error::Unavailable("late".into()))),
            Resolution::Stale
        );
        assert_eq!(workflow.status(), RequestStatus::Submitting);
        workflow.resolve(fourth.token, Ok(vec![]));
        assert_eq!(workflow.status(), RequestStatus::Submitted);
    }

    #[test]
    fn outcome_without_submit_is_stale() {
        let mut workflow = lax_workflow();
        assert_eq!(
            workflow.resolve(
                RequestToken::default(),
                Ok(vec![option("f1", "Acme", 100.0, "2h")])
            ),
            Resolution::Stale
        );
        assert_eq!(workflow.status(), RequestStatus::Idle);
        assert!(workflow.options().is_empty());
    }

    #[test]
    fn latest_outcome_applies_once() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        let options = vec![option("f1", "Acme", 100.0, "2h")];
        assert_eq!(
            workflow.resolve(ticket.token, Ok(options.clone())),
            Resolution::Applied(RequestStatus::Submitted)
        );

        assert_eq!(
            workflow.resolve(ticket.token, Err(lookup::Error::Unavailable("again".into()))),
            Resolution::Stale
        );
        assert_eq!(workflow.status(), RequestStatus::Submitted);
        assert_eq!(workflow.options(), options.as_slice());
    }

    #[test]
    fn dispose_discards_late_outcomes() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        workflow.dispose();

        assert_eq!(
            workflow.resolve(ticket.token, Ok(vec![option("f1", "Acme", 100.0, "2h")])),
            Resolution::Disposed
        );
        assert!(workflow.options().is_empty());
        assert_eq!(workflow.status(), RequestStatus::Submitting);
        assert_eq!(workflow.begin_submit(), Err(Error::Disposed));
        assert!(workflow.is_disposed());
    }

    #[test]
    fn selection_tolerates_missing_id() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        workflow.resolve(ticket.token, Ok(vec![option("f1", "Acme", 100.0, "2h")]));

        workflow.select_flight("missing");
        assert_eq!(workflow.selected_id(), Some("missing"));
        assert_eq!(workflow.current_selection(), None);
        assert_eq!(workflow.summary(), None);
        assert_eq!(workflow.total_price(), None);

        workflow.select_flight("f1");
        assert_eq!(workflow.current_selection().map(|o| o.id.as_str()), Some("f1"));

        workflow.clear_selection();
        assert_eq!(workflow.current_selection(), None);
    }

    #[test]
    fn selection_dangles_after_research() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        workflow.resolve(ticket.token, Ok(vec![option("f1", "Acme", 100.0, "2h")]));
        workflow.select_flight("f1");
        assert!(workflow.summary().is_some());

        // Previous options stay visible while the next search is in flight.
        let ticket = workflow.begin_submit().unwrap();
        assert!(workflow.summary().is_some());

        workflow.resolve(ticket.token, Ok(vec![option("f2", "Other", 90.0, "3h")]));
        assert_eq!(workflow.selected_id(), Some("f1"));
        assert_eq!(workflow.current_selection(), None);
        assert_eq!(workflow.summary(), None);
    }

    #[test]
    fn total_price_is_price_times_passengers() {
        let mut workflow = lax_workflow();
        workflow.set_passenger_count(7).unwrap();
        let ticket = workflow.begin_submit().unwrap();
        workflow.resolve(ticket.token, Ok(vec![option("f1", "Acme", 133.25, "2h")]));
        workflow.select_flight("f1");
        assert_eq!(workflow.total_price(), Some(133.25 * 7.0));

        // Pricing follows the criteria, not the moment of selection.
        workflow.set_passenger_count(1).unwrap();
        assert_eq!(workflow.total_price(), Some(133.25));
    }

    #[test_log::test(tokio::test)]
    async fn lax_scenario() {
        let lookup = ScriptedLookup::new(vec![Ok(vec![option("f1", "Acme", 100.0, "2h")])]);
        let mut workflow = lax_workflow();

        let resolution = workflow.submit(&lookup).await.unwrap();
        assert_eq!(resolution, Resolution::Applied(RequestStatus::Submitted));
        assert_eq!(workflow.status(), RequestStatus::Submitted);
        assert_eq!(workflow.options(), &[option("f1", "Acme", 100.0, "2h")]);

        let queries = lookup.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![FlightQuery {
                destination: "LAX".into(),
                departure: "2024-06-01".into(),
                arrival: None,
                passengers: PassengerCount::try_from(2).unwrap(),
            }]
        );

        workflow.select_flight("f1");
        let summary = workflow.summary().unwrap();
        assert_eq!(summary.option.airline, "Acme");
        assert_eq!(summary.option.duration_label, "2h");
        assert_eq!(summary.passengers.get(), 2);
        assert_eq!(summary.total_price, 200.0);

        workflow.select_flight("missing");
        assert_eq!(workflow.current_selection(), None);
        assert_eq!(workflow.summary(), None);
    }

    #[test_log::test(tokio::test)]
    async fn submit_absorbs_lookup_failure() {
        let lookup = ScriptedLookup::new(vec![
            Err(lookup::Error::Unavailable("connection reset".into())),
            Ok(vec![option("f1", "Acme", 100.0, "2h")]),
        ]);
        let mut workflow = lax_workflow();

        assert_eq!(
            workflow.submit(&lookup).await,
            Ok(Resolution::Applied(RequestStatus::Error))
        );
        assert_eq!(
            workflow.submit(&lookup).await,
            Ok(Resolution::Applied(RequestStatus::Submitted))
        );
        assert_eq!(workflow.options().len(), 1);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut workflow = lax_workflow();
        let ticket = workflow.begin_submit().unwrap();
        workflow.resolve(ticket.token, Ok(vec![option("f1", "Acme", 100.0, "2h")]));
        workflow.select_flight("f1");

        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.status, RequestStatus::Submitted);
        assert_eq!(snapshot.selected_id.as_deref(), Some("f1"));
        assert_eq!(snapshot.summary.map(|s| s.total_price), Some(200.0));
        assert_eq!(snapshot.error_message, None);

        let json = serde_json::to_value(workflow.snapshot()).unwrap();
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["criteria"]["isRoundtrip"], false);
        assert_eq!(json["options"][0]["duration"], "2h");
        assert_eq!(json["summary"]["totalPrice"], 200.0);
    }
}
