//! Debounced autocomplete.
//!
//! `Idle -> Pending(timer) -> Fetching -> Idle`. Every keystroke cancels the
//! pending timer first. A fetch is issued only when a timer survives its full
//! delay, and a reply is applied only if it answers the latest fetch. Fetches
//! are never aborted; superseded replies are simply dropped.

use std::time::Duration;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::entry::Suggestion;
use crate::error::SuggestionError;
use crate::explorer::sequencer::{RequestSequencer, RequestToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionPhase {
    Idle,
    Pending,
    Fetching,
}

/// A debounce timer for the driver to run. It fires unless `cancel` trips
/// first.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    pub id: u64,
    pub delay: Duration,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone)]
pub enum InputEffect {
    /// Empty query: suggestions hidden.
    Cleared,
    /// Query shorter than the threshold: suggestions hidden, nothing pending.
    BelowThreshold,
    /// A new timer replaced any previous one.
    Scheduled(DebounceTimer),
}

#[derive(Debug, Clone)]
pub struct SuggestionFetch {
    pub token: RequestToken,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionUpdate {
    Stale,
    Replaced,
    Failed,
}

#[derive(Debug)]
pub struct SuggestionOrchestrator {
    debounce: Duration,
    min_len: usize,
    phase: SuggestionPhase,
    query: String,
    timer: Option<DebounceTimer>,
    timer_ids: u64,
    sequencer: RequestSequencer,
    suggestions: Vec<Suggestion>,
}

impl SuggestionOrchestrator {
    pub fn new(debounce: Duration, min_len: usize) -> Self {
        Self {
            debounce,
            min_len,
            phase: SuggestionPhase::Idle,
            query: String::new(),
            timer: None,
            timer_ids: 0,
            sequencer: RequestSequencer::new("suggestions"),
            suggestions: Vec::new(),
        }
    }

    pub fn phase(&self) -> SuggestionPhase {
        self.phase
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// The panel is shown only while there is something in it.
    pub fn is_visible(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn on_input(&mut self, raw: &str) -> InputEffect {
        self.cancel_timer();

        let query = raw.trim();
        self.query = query.to_string();
        let len = query.chars().count();

        if len == 0 || len < self.min_len {
            self.sequencer.invalidate();
            self.suggestions.clear();
            self.phase = SuggestionPhase::Idle;
            return if len == 0 {
                InputEffect::Cleared
            } else {
                InputEffect::BelowThreshold
            };
        }

        self.timer_ids += 1;
        let timer = DebounceTimer {
            id: self.timer_ids,
            delay: self.debounce,
            cancel: CancellationToken::new(),
        };
        debug!("debounce timer #{} for {:?}", timer.id, self.query);
        self.timer = Some(timer.clone());
        self.phase = SuggestionPhase::Pending;
        InputEffect::Scheduled(timer)
    }

    /// Called when a timer ran its full delay. Returns the fetch to issue,
    /// or `None` if that timer had already been replaced or cancelled.
    pub fn on_timer(&mut self, timer_id: u64) -> Option<SuggestionFetch> {
        match &self.timer {
            Some(t) if t.id == timer_id && !t.cancel.is_cancelled() => {}
            _ => {
                debug!("debounce timer #{} no longer current", timer_id);
                return None;
            }
        }
        self.timer = None;
        let token = self.sequencer.issue();
        self.phase = SuggestionPhase::Fetching;
        Some(SuggestionFetch {
            token,
            query: self.query.clone(),
        })
    }

    pub fn on_response(
        &mut self,
        sequence_id: u64,
        result: Result<Vec<Suggestion>, SuggestionError>,
    ) -> SuggestionUpdate {
        if !self.sequencer.accept(sequence_id) {
            return SuggestionUpdate::Stale;
        }
        self.phase = if self.timer.is_some() {
            SuggestionPhase::Pending
        } else {
            SuggestionPhase::Idle
        };
        match result {
            Ok(suggestions) => {
                debug!("{} suggestions for {:?}", suggestions.len(), self.query);
                self.suggestions = suggestions;
                SuggestionUpdate::Replaced
            }
            Err(e) => {
                warn!("suggestions unavailable: {}", e);
                SuggestionUpdate::Failed
            }
        }
    }

    /// Picks a suggestion and closes the panel.
    pub fn select(&mut self, index: usize) -> Option<Suggestion> {
        let picked = self.suggestions.get(index).cloned();
        if picked.is_some() {
            self.dismiss();
        }
        picked
    }

    /// Hides the panel and forgets anything pending or in flight.
    pub fn dismiss(&mut self) {
        self.cancel_timer();
        self.sequencer.invalidate();
        self.suggestions.clear();
        self.phase = SuggestionPhase::Idle;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
        }
    }
}
