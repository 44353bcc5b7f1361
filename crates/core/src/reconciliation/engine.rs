use thiserror::Error;

use crate::domain::match_result::MatchResult;
use crate::domain::submission::Submission;
use crate::reconciliation::states::{
    FixtureEvent, FixtureState, Reconciliation, TransitionOutcome,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FixtureTransitionError {
    #[error("invalid fixture transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FixtureState, event: FixtureEvent },
}

/// Decides what a freshly recorded submission means for its fixture.
///
/// Both sides are compared in the fixture's home/away frame; the
/// team-relative pairs the reporters typed are never compared directly.
pub fn reconcile(submission: &Submission, counterpart: Option<&Submission>) -> Reconciliation {
    let Some(counterpart) = counterpart else {
        return Reconciliation::Pending;
    };

    if counterpart.scoreline == submission.scoreline {
        Reconciliation::Resolved(MatchResult::from_submission(submission))
    } else {
        Reconciliation::Conflict {
            submitted: submission.scoreline,
            counterpart: counterpart.scoreline,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_state(&self) -> FixtureState {
        FixtureState::NoSubmissions
    }

    /// State implied by what the store currently holds for a fixture.
    pub fn observe(&self, live_submissions: usize, has_result: bool) -> FixtureState {
        match (has_result, live_submissions) {
            (true, _) => FixtureState::Resolved,
            (false, 0) => FixtureState::NoSubmissions,
            (false, 1) => FixtureState::OneSubmission,
            (false, _) => FixtureState::Conflict,
        }
    }

    pub fn apply(
        &self,
        current: FixtureState,
        event: FixtureEvent,
    ) -> Result<TransitionOutcome, FixtureTransitionError> {
        use FixtureEvent::{CounterpartAgreed, CounterpartDisagreed, SubmissionRecorded};
        use FixtureState::{Conflict, NoSubmissions, OneSubmission, Resolved};

        let to = match (current, event) {
            (NoSubmissions, SubmissionRecorded) => OneSubmission,
            (OneSubmission, CounterpartAgreed) => Resolved,
            (OneSubmission, CounterpartDisagreed) => Conflict,
            (state, event) => {
                return Err(FixtureTransitionError::InvalidTransition { state, event });
            }
        };

        Ok(TransitionOutcome { from: current, to, event })
    }

    /// Applies a reconciliation decision to the state the fixture was in
    /// before the new submission arrived.
    pub fn advance(
        &self,
        had_counterpart: bool,
        reconciliation: &Reconciliation,
    ) -> Result<TransitionOutcome, FixtureTransitionError> {
        let from = if had_counterpart { FixtureState::OneSubmission } else { self.initial_state() };
        self.apply(from, reconciliation.event())
    }
}
