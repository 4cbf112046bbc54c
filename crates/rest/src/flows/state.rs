//! Shared flow machinery: load stages and request sequencing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::FlowError;

/// Where a flow is in its load cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage<T> {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded.
    Loaded(T),
    /// The last request failed. Earlier results are gone.
    Failed(FlowError),
}

// Written by hand so `Stage<T>: Default` holds without `T: Default`.
impl<T> Default for Stage<T> {
    fn default() -> Self {
        Stage::Idle
    }
}

impl<T> Stage<T> {
    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Stage::Loading)
    }

    /// The loaded value, if any.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Stage::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&FlowError> {
        match self {
            Stage::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Settles the stage from a finished request.
    pub fn settle(&mut self, result: Result<T, FlowError>) {
        *self = match result {
            Ok(value) => Stage::Loaded(value),
            Err(err) => Stage::Failed(err),
        };
    }
}

/// Identifies one request issued on a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Orders the requests issued on one flow instance.
///
/// Each request takes a [`Ticket`] before it starts. When it finishes, it may
/// only write its result if its ticket is still the newest one and the flow
/// has not been torn down; otherwise the result is dropped.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
    torn_down: AtomicBool,
}

impl RequestSequence {
    /// Creates a fresh sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket, superseding all earlier ones.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a finished request holding `ticket` may write its result.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.is_torn_down() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks the flow as gone. Every outstanding request becomes stale.
    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    /// Whether the flow has been torn down.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let sequence = RequestSequence::new();
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(first < second);
        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));
    }

    #[test]
    fn test_tear_down_invalidates_everything() {
        let sequence = RequestSequence::new();
        let ticket = sequence.issue();
        sequence.tear_down();
        assert!(!sequence.is_current(ticket));
        assert!(!sequence.is_current(sequence.issue()));
    }

    #[test]
    fn test_stage_settle() {
        let mut stage: Stage<u32> = Stage::Loading;
        assert!(stage.is_loading());

        stage.settle(Ok(3));
        assert_eq!(stage.loaded(), Some(&3));

        stage.settle(Err(FlowError::QueryFailed("down".to_string())));
        assert!(!stage.is_loading());
        assert!(stage.loaded().is_none());
        assert_eq!(stage.error().map(FlowError::code), Some("query-failed"));
    }
}
