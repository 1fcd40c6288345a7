//! Single-flight, cancellable full search.
//!
//! `Idle -> Searching -> {Completed | Cancelled | Failed} -> Idle`.
//!
//! At most one search is outstanding; the guard is local and runs before any
//! request is issued. Cancelling trips the request's own cancellation handle
//! and moves to `Cancelled` at once, whether or not the transport has
//! stopped yet. Any reply that arrives afterwards is stale.

use log::{info, warn};

use crate::entry::SearchOutcome;
use crate::error::SearchError;
use crate::explorer::sequencer::{RequestSequencer, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching { query: String },
    Completed { query: String, outcome: SearchOutcome },
    Cancelled,
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct SearchStart {
    pub token: RequestToken,
    pub query: String,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUpdate {
    Stale,
    /// `partial` is set when the server stopped on its own time bound.
    Completed { partial: bool },
    Failed(SearchError),
}

#[derive(Debug)]
pub struct SearchOrchestrator {
    min_len: usize,
    max_results: u32,
    state: SearchState,
    sequencer: RequestSequencer,
    in_flight: Option<RequestToken>,
}

impl SearchOrchestrator {
    pub fn new(min_len: usize, max_results: u32) -> Self {
        Self {
            min_len,
            max_results,
            state: SearchState::Idle,
            sequencer: RequestSequencer::new("search"),
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching { .. })
    }

    pub fn results(&self) -> Option<(&str, &SearchOutcome)> {
        match &self.state {
            SearchState::Completed { query, outcome } => Some((query.as_str(), outcome)),
            _ => None,
        }
    }

    /// Validates and enters `Searching`. Nothing changes on rejection.
    pub fn begin(&mut self, raw_query: &str, connected: bool) -> Result<SearchStart, SearchError> {
        let query = raw_query.trim();
        if query.chars().count() < self.min_len {
            return Err(SearchError::TooShort { min: self.min_len });
        }
        if self.is_searching() {
            return Err(SearchError::AlreadyRunning);
        }
        if !connected {
            return Err(SearchError::NotConnected);
        }

        let token = self.sequencer.issue();
        info!("search {:?} started (#{})", query, token.sequence_id());
        self.in_flight = Some(token.clone());
        self.state = SearchState::Searching {
            query: query.to_string(),
        };
        Ok(SearchStart {
            token,
            query: query.to_string(),
            max_results: self.max_results,
        })
    }

    /// Returns `false` if there was no search to cancel.
    pub fn cancel(&mut self) -> bool {
        if !self.is_searching() {
            return false;
        }
        if let Some(token) = self.in_flight.take() {
            info!("search #{} cancelled", token.sequence_id());
            token.cancel();
        }
        self.sequencer.invalidate();
        self.state = SearchState::Cancelled;
        true
    }

    pub fn on_response(
        &mut self,
        sequence_id: u64,
        result: Result<SearchOutcome, SearchError>,
    ) -> SearchUpdate {
        if !self.is_searching() || !self.sequencer.accept(sequence_id) {
            return SearchUpdate::Stale;
        }
        self.in_flight = None;
        let query = match std::mem::replace(&mut self.state, SearchState::Idle) {
            SearchState::Searching { query } => query,
            _ => String::new(),
        };

        match result {
            Ok(outcome) => {
                let partial = outcome.timed_out;
                info!(
                    "search {:?}: {} results, total {}, {} folders{}",
                    query,
                    outcome.results.len(),
                    outcome.total,
                    outcome.folders_visited,
                    if partial { " (timed out)" } else { "" }
                );
                self.state = SearchState::Completed { query, outcome };
                SearchUpdate::Completed { partial }
            }
            Err(e) => {
                warn!("search {:?} failed: {}", query, e);
                self.state = SearchState::Failed {
                    message: e.to_string(),
                };
                SearchUpdate::Failed(e)
            }
        }
    }

    /// Back to `Idle`, dropping results. A running search is cancelled.
    pub fn clear(&mut self) {
        self.cancel();
        self.state = SearchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{DirectoryEntry, SearchResultEntry};
    use crate::explorer::path::RemotePath;

    fn orchestrator() -> SearchOrchestrator {
        SearchOrchestrator::new(2, 100)
    }

    fn outcome(names: &[&str], timed_out: bool) -> SearchOutcome {
        SearchOutcome {
            results: names
                .iter()
                .map(|n| SearchResultEntry {
                    entry: DirectoryEntry::file(*n, 1, "2024-01-01 00:00:00"),
                    full_path: RemotePath::from(format!("/x/{n}")),
                })
                .collect(),
            timed_out,
            folders_visited: 3,
            total: names.len() as u32,
        }
    }

    #[test]
    fn too_short_query_is_rejected_without_state_change() {
        let mut s = orchestrator();
        assert_eq!(
            s.begin(" a ", true).unwrap_err(),
            SearchError::TooShort { min: 2 }
        );
        assert_eq!(s.state(), &SearchState::Idle);
    }

    #[test]
    fn second_search_is_rejected_while_running() {
        let mut s = orchestrator();
        let first = s.begin("factura", true).unwrap();
        assert_eq!(s.begin("otra", true).unwrap_err(), SearchError::AlreadyRunning);
        assert!(!first.token.is_cancelled());
        assert_eq!(
            s.state(),
            &SearchState::Searching {
                query: "factura".into()
            }
        );
    }

    #[test]
    fn request_carries_cap() {
        let mut s = orchestrator();
        let start = s.begin("  factura ", true).unwrap();
        assert_eq!(start.query, "factura");
        assert_eq!(start.max_results, 100);
    }

    #[test]
    fn cancel_trips_handle_and_discards_late_reply() {
        let mut s = orchestrator();
        let start = s.begin("factura", true).unwrap();
        assert!(s.cancel());
        assert!(start.token.is_cancelled());
        assert_eq!(s.state(), &SearchState::Cancelled);
        assert!(s.results().is_none());

        let update = s.on_response(start.token.sequence_id(), Ok(outcome(&["a"], false)));
        assert_eq!(update, SearchUpdate::Stale);
        assert_eq!(s.state(), &SearchState::Cancelled);
    }

    #[test]
    fn timeout_is_completion_not_failure() {
        let mut s = orchestrator();
        let start = s.begin("x1", true).unwrap();
        let update = s.on_response(start.token.sequence_id(), Ok(outcome(&["x1.pdf"], true)));
        assert_eq!(update, SearchUpdate::Completed { partial: true });
        let (query, result) = s.results().unwrap();
        assert_eq!(query, "x1");
        assert!(result.timed_out);
    }

    #[test]
    fn failure_restores_navigation() {
        let mut s = orchestrator();
        let start = s.begin("factura", true).unwrap();
        let update = s.on_response(
            start.token.sequence_id(),
            Err(SearchError::Remote("Error al buscar".into())),
        );
        assert!(matches!(update, SearchUpdate::Failed(_)));
        assert!(s.results().is_none());
    }

    #[test]
    fn new_search_allowed_after_completion() {
        let mut s = orchestrator();
        let start = s.begin("factura", true).unwrap();
        s.on_response(start.token.sequence_id(), Ok(outcome(&["factura.pdf"], false)));
        assert!(s.begin("recibo", true).is_ok());
    }

    #[test]
    fn clear_returns_to_idle_and_cancels() {
        let mut s = orchestrator();
        let start = s.begin("factura", true).unwrap();
        s.clear();
        assert!(start.token.is_cancelled());
        assert_eq!(s.state(), &SearchState::Idle);
    }

    #[test]
    fn disconnected_search_is_refused() {
        let mut s = orchestrator();
        assert_eq!(s.begin("factura", false).unwrap_err(), SearchError::NotConnected);
    }
}
