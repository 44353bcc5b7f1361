use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::fixture::{Fixture, FixtureCandidate, FixtureId};
use crate::domain::identity::{Identity, OrgId, PhoneNumber, TeamId};
use crate::domain::match_result::MatchResult;
use crate::domain::submission::Submission;
use crate::errors::StoreError;
use crate::ledger::{CommitOutcome, ContestedFixture, LedgerUnit, RecordOutcome, SubmissionLedger};
use crate::store::{FixtureStore, IdentityDirectory};

#[derive(Clone, Debug)]
struct ScheduledFixture {
    fixture: Fixture,
    is_bye: bool,
}

#[derive(Clone, Debug, Default)]
struct LeagueTables {
    identities: Vec<Identity>,
    fixtures: Vec<ScheduledFixture>,
    submissions: Vec<Submission>,
    results: BTreeMap<FixtureId, MatchResult>,
}

/// Process-local league store implementing every collaborator contract.
///
/// A [`LedgerUnit`] holds the store lock for its whole lifetime and works on
/// a staged copy, so uncommitted units never leak partial state.
#[derive(Clone, Default)]
pub struct InMemoryLeague {
    tables: Arc<Mutex<LeagueTables>>,
}

impl InMemoryLeague {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, identity: Identity) {
        self.tables.lock().await.identities.push(identity);
    }

    pub async fn schedule(&self, fixture: Fixture) {
        self.tables.lock().await.fixtures.push(ScheduledFixture { fixture, is_bye: false });
    }

    pub async fn schedule_bye(&self, fixture: Fixture) {
        self.tables.lock().await.fixtures.push(ScheduledFixture { fixture, is_bye: true });
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.tables.lock().await.submissions.clone()
    }

    pub async fn result_for(&self, fixture_id: &FixtureId) -> Option<MatchResult> {
        self.tables.lock().await.results.get(fixture_id).cloned()
    }

    pub async fn results(&self) -> Vec<MatchResult> {
        self.tables.lock().await.results.values().cloned().collect()
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryLeague {
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Vec<Identity>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.identities.iter().filter(|identity| &identity.phone == phone).cloned().collect())
    }
}

#[async_trait]
impl FixtureStore for InMemoryLeague {
    async fn recent_fixtures(
        &self,
        team_id: &TeamId,
        org_id: &OrgId,
        limit: u32,
    ) -> Result<Vec<FixtureCandidate>, StoreError> {
        let tables = self.tables.lock().await;
        let mut fixtures: Vec<&Fixture> = tables
            .fixtures
            .iter()
            .filter(|scheduled| !scheduled.is_bye)
            .map(|scheduled| &scheduled.fixture)
            .filter(|fixture| &fixture.org_id == org_id && fixture.side_of(team_id).is_some())
            .collect();
        fixtures.sort_by(|left, right| {
            right.match_date.cmp(&left.match_date).then_with(|| left.id.cmp(&right.id))
        });

        Ok(fixtures
            .into_iter()
            .take(limit as usize)
            .map(|fixture| FixtureCandidate {
                fixture: fixture.clone(),
                has_result: tables.results.contains_key(&fixture.id),
            })
            .collect())
    }
}

#[async_trait]
impl SubmissionLedger for InMemoryLeague {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryLedgerUnit { guard, staged }))
    }

    async fn contested_fixtures(&self) -> Result<Vec<ContestedFixture>, StoreError> {
        let tables = self.tables.lock().await;
        let mut grouped: BTreeMap<FixtureId, Vec<Submission>> = BTreeMap::new();
        for submission in &tables.submissions {
            if tables.results.contains_key(&submission.fixture_id) {
                continue;
            }
            grouped.entry(submission.fixture_id.clone()).or_default().push(submission.clone());
        }

        Ok(grouped
            .into_iter()
            .filter(|(_, submissions)| submissions.len() >= 2)
            .map(|(fixture_id, submissions)| ContestedFixture { fixture_id, submissions })
            .collect())
    }
}

struct InMemoryLedgerUnit {
    guard: OwnedMutexGuard<LeagueTables>,
    staged: LeagueTables,
}

#[async_trait]
impl LedgerUnit for InMemoryLedgerUnit {
    async fn record(&mut self, submission: Submission) -> Result<RecordOutcome, StoreError> {
        let exists = self.staged.submissions.iter().any(|live| {
            live.fixture_id == submission.fixture_id && live.team_id == submission.team_id
        });
        if exists {
            return Ok(RecordOutcome::Duplicate);
        }

        self.staged.submissions.push(submission.clone());
        Ok(RecordOutcome::Recorded(submission))
    }

    async fn find_counterpart(
        &mut self,
        fixture_id: &FixtureId,
        excluding_team: &TeamId,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(self
            .staged
            .submissions
            .iter()
            .find(|live| &live.fixture_id == fixture_id && &live.team_id != excluding_team)
            .cloned())
    }

    async fn live_submissions(
        &mut self,
        fixture_id: &FixtureId,
    ) -> Result<Vec<Submission>, StoreError> {
        let mut live: Vec<Submission> = self
            .staged
            .submissions
            .iter()
            .filter(|submission| &submission.fixture_id == fixture_id)
            .cloned()
            .collect();
        live.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        Ok(live)
    }

    async fn is_scored(&mut self, fixture_id: &FixtureId) -> Result<bool, StoreError> {
        Ok(self.staged.results.contains_key(fixture_id))
    }

    async fn commit_result(&mut self, result: &MatchResult) -> Result<CommitOutcome, StoreError> {
        if self.staged.results.contains_key(&result.fixture_id) {
            return Ok(CommitOutcome::AlreadyRecorded);
        }

        self.staged.results.insert(result.fixture_id.clone(), result.clone());
        Ok(CommitOutcome::Committed)
    }

    async fn clear(&mut self, fixture_id: &FixtureId) -> Result<u64, StoreError> {
        let before = self.staged.submissions.len();
        self.staged.submissions.retain(|submission| &submission.fixture_id != fixture_id);
        Ok((before - self.staged.submissions.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
