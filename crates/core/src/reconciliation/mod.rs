pub mod engine;
pub mod states;

pub use engine::{reconcile, FixtureTransitionError, ReconciliationEngine};
pub use states::{FixtureEvent, FixtureState, Reconciliation, TransitionOutcome};
