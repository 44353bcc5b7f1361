pub mod audit;
pub mod command;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod locator;
pub mod reconciliation;
pub mod replies;
pub mod reporting;
pub mod store;

pub use command::{parse_command, CommandParser, DirectionClassifier, InboundCommand, ParseFailure};
pub use domain::fixture::{Fixture, FixtureCandidate, FixtureId, SeasonId, Side};
pub use domain::identity::{Identity, OrgId, PhoneNumber, TeamId, UserId};
pub use domain::match_result::MatchResult;
pub use domain::score::{ScorePair, Scoreline, MAX_SCORE};
pub use domain::submission::{Submission, SubmissionId, SubmissionSource};
pub use errors::{ApplicationError, DomainError, InterfaceError, StoreError};
pub use ledger::{CommitOutcome, ContestedFixture, LedgerUnit, RecordOutcome, SubmissionLedger};
pub use locator::{FixtureLocator, LocatedFixture, Location};
pub use reconciliation::{reconcile, FixtureState, Reconciliation, ReconciliationEngine};
pub use reporting::{
    FixtureLocks, FixtureStatus, InboundMessage, ReportOutcome, ReportingStores, ScoreReporter,
    StatusReport, SweepSummary,
};
pub use store::{FixtureStore, IdentityDirectory, InMemoryLeague};
