//! Submission ledger contract.
//!
//! All writes go through a [`LedgerUnit`], a transactional scope obtained from
//! [`SubmissionLedger::begin`]. A unit that is dropped without
//! [`LedgerUnit::commit`] leaves the store untouched, so "record own report,
//! read counterpart, commit result, clear reports" lands atomically or not at
//! all.

use async_trait::async_trait;

use crate::domain::fixture::FixtureId;
use crate::domain::identity::TeamId;
use crate::domain::match_result::MatchResult;
use crate::domain::submission::Submission;
use crate::errors::StoreError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(Submission),
    /// A live submission already exists for this (fixture, team); the
    /// existing entry is left untouched.
    Duplicate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    AlreadyRecorded,
}

/// A fixture holding two or more live submissions without a result. In
/// steady state these are conflicts awaiting manual review.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContestedFixture {
    pub fixture_id: FixtureId,
    pub submissions: Vec<Submission>,
}

#[async_trait]
pub trait SubmissionLedger: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, StoreError>;

    async fn contested_fixtures(&self) -> Result<Vec<ContestedFixture>, StoreError>;
}

#[async_trait]
pub trait LedgerUnit: Send {
    /// Inserts `submission` unless one already exists for its
    /// (fixture, team). The check and the insert are a single store operation.
    async fn record(&mut self, submission: Submission) -> Result<RecordOutcome, StoreError>;

    /// The other team's live submission for `fixture_id`, if any.
    async fn find_counterpart(
        &mut self,
        fixture_id: &FixtureId,
        excluding_team: &TeamId,
    ) -> Result<Option<Submission>, StoreError>;

    /// Live submissions for `fixture_id`, oldest first.
    async fn live_submissions(
        &mut self,
        fixture_id: &FixtureId,
    ) -> Result<Vec<Submission>, StoreError>;

    async fn is_scored(&mut self, fixture_id: &FixtureId) -> Result<bool, StoreError>;

    /// Inserts the result for its fixture, at most once.
    async fn commit_result(&mut self, result: &MatchResult) -> Result<CommitOutcome, StoreError>;

    /// Removes every live submission for `fixture_id`, returning how many
    /// were removed.
    async fn clear(&mut self, fixture_id: &FixtureId) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
