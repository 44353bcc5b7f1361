use serde::{Deserialize, Serialize};

use crate::domain::match_result::MatchResult;
use crate::domain::score::Scoreline;

/// Per-fixture reconciliation state. `Resolved` and `Conflict` are terminal
/// here; a conflict only moves again through manual admin action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureState {
    NoSubmissions,
    OneSubmission,
    Resolved,
    Conflict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureEvent {
    SubmissionRecorded,
    CounterpartAgreed,
    CounterpartDisagreed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconciliation {
    Pending,
    Resolved(MatchResult),
    Conflict { submitted: Scoreline, counterpart: Scoreline },
}

impl Reconciliation {
    pub fn event(&self) -> FixtureEvent {
        match self {
            Self::Pending => FixtureEvent::SubmissionRecorded,
            Self::Resolved(_) => FixtureEvent::CounterpartAgreed,
            Self::Conflict { .. } => FixtureEvent::CounterpartDisagreed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FixtureState,
    pub to: FixtureState,
    pub event: FixtureEvent,
}
