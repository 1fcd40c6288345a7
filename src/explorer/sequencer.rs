//! Request sequencing for asynchronous operations.
//!
//! Each component that issues overlapping requests owns a `RequestSequencer`.
//! Issuing a request bumps the component's latest sequence id; a result is
//! applied only when its token still carries that latest id. Anything else
//! is a stale result and is dropped without side effects.

use log::debug;
use tokio_util::sync::CancellationToken;

/// Identity of one asynchronous call plus the handle used to abort it.
#[derive(Debug, Clone)]
pub struct RequestToken {
    sequence_id: u64,
    cancel: CancellationToken,
}

impl RequestToken {
    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    /// Cancellation handle for this request only.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug)]
pub struct RequestSequencer {
    name: &'static str,
    latest: u64,
}

impl RequestSequencer {
    pub fn new(name: &'static str) -> Self {
        Self { name, latest: 0 }
    }

    /// Issues a token that supersedes every earlier one.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        debug!("{}: issued request #{}", self.name, self.latest);
        RequestToken {
            sequence_id: self.latest,
            cancel: CancellationToken::new(),
        }
    }

    /// Makes every outstanding token stale without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
        debug!("{}: outstanding requests invalidated", self.name);
    }

    pub fn is_latest(&self, sequence_id: u64) -> bool {
        sequence_id == self.latest
    }

    /// Like `is_latest`, logging the discard when the id is stale.
    pub fn accept(&self, sequence_id: u64) -> bool {
        if self.is_latest(sequence_id) {
            true
        } else {
            debug!(
                "{}: discarding stale result #{} (latest #{})",
                self.name, sequence_id, self.latest
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_supersedes_older() {
        let mut seq = RequestSequencer::new("test");
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.accept(first.sequence_id()));
        assert!(seq.accept(second.sequence_id()));
    }

    #[test]
    fn invalidate_makes_latest_stale() {
        let mut seq = RequestSequencer::new("test");
        let token = seq.issue();
        seq.invalidate();
        assert!(!seq.is_latest(token.sequence_id()));
    }

    #[test]
    fn cancelling_one_token_leaves_others_alone() {
        let mut seq = RequestSequencer::new("test");
        let old = seq.issue();
        let new = seq.issue();
        old.cancel();
        assert!(old.is_cancelled());
        assert!(!new.is_cancelled());
        assert!(old.cancel_handle().is_cancelled());
    }
}
