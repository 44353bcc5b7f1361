//! One inbound message in, one outcome out.
//!
//! [`ScoreReporter`] wires the parser, fixture locator, submission ledger and
//! reconciliation engine together. Each call to [`ScoreReporter::handle`] is
//! an independent unit of work; the per-fixture critical section runs under a
//! [`FixtureLocks`] guard inside a single [`LedgerUnit`].

pub mod locks;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink};
use crate::command::{CommandParser, InboundCommand, ParseFailure};
use crate::domain::fixture::FixtureId;
use crate::domain::identity::{Identity, PhoneNumber};
use crate::domain::match_result::MatchResult;
use crate::domain::score::{ScorePair, Scoreline};
use crate::domain::submission::{Submission, SubmissionSource};
use crate::errors::{ApplicationError, DomainError};
use crate::ledger::{CommitOutcome, LedgerUnit, RecordOutcome, SubmissionLedger};
use crate::locator::{FixtureLocator, LocatedFixture, Location};
use crate::reconciliation::{reconcile, FixtureState, Reconciliation, ReconciliationEngine};
use crate::replies;
use crate::store::{FixtureStore, IdentityDirectory};

pub use locks::FixtureLocks;

/// How many times a report is re-located when the chosen fixture gets scored
/// by a concurrent unit of work before the lock was taken.
pub const MAX_LOCATE_ATTEMPTS: usize = 3;

const ACTOR: &str = "score-reporter";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: String,
    pub body: String,
    pub correlation_id: String,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "scoreline", rename_all = "snake_case")]
pub enum FixtureStatus {
    NoScoreYet,
    AwaitingOpponent(Scoreline),
    OpponentReported,
    Conflict,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub fixture_id: FixtureId,
    pub week: u32,
    pub status: FixtureStatus,
}

/// Terminal outcome of one unit of work. Each maps to exactly one reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    UnknownIdentity,
    Help,
    ParseFailure(ParseFailure),
    NoEligibleFixture,
    AllFixturesScored,
    Duplicate { week: u32 },
    Pending { week: u32, scoreline: Scoreline },
    Resolved { week: u32, result: MatchResult },
    Conflict { week: u32 },
    Status(StatusReport),
}

impl ReportOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownIdentity => "unknown_identity",
            Self::Help => "help",
            Self::ParseFailure(_) => "parse_failure",
            Self::NoEligibleFixture => "no_eligible_fixture",
            Self::AllFixturesScored => "all_fixtures_scored",
            Self::Duplicate { .. } => "duplicate",
            Self::Pending { .. } => "pending",
            Self::Resolved { .. } => "resolved",
            Self::Conflict { .. } => "conflict",
            Self::Status(_) => "status",
        }
    }

    pub fn reply(&self) -> String {
        replies::render(self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub examined: usize,
    pub resolved: usize,
    pub conflicts: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum SweepStep {
    Resolved,
    Conflict,
    Skipped,
}

/// The collaborator stores a reporter works against.
#[derive(Clone)]
pub struct ReportingStores {
    pub identities: Arc<dyn IdentityDirectory>,
    pub fixtures: Arc<dyn FixtureStore>,
    pub ledger: Arc<dyn SubmissionLedger>,
}

impl ReportingStores {
    /// Uses one value for every contract, as the in-memory and SQL stores do.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: IdentityDirectory + FixtureStore + SubmissionLedger + 'static,
    {
        Self { identities: store.clone(), fixtures: store.clone(), ledger: store }
    }
}

#[derive(Clone)]
pub struct ScoreReporter {
    stores: ReportingStores,
    parser: CommandParser,
    locator: FixtureLocator,
    engine: ReconciliationEngine,
    locks: FixtureLocks,
    audit: Arc<dyn AuditSink>,
    source: SubmissionSource,
}

impl ScoreReporter {
    pub fn new(stores: ReportingStores) -> Self {
        Self {
            stores,
            parser: CommandParser::default(),
            locator: FixtureLocator::default(),
            engine: ReconciliationEngine::new(),
            locks: FixtureLocks::new(),
            audit: Arc::new(TracingAuditSink),
            source: SubmissionSource::Sms,
        }
    }

    pub fn with_parser(mut self, parser: CommandParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_locator(mut self, locator: FixtureLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn audit_sink_name(&self) -> &'static str {
        self.audit.name()
    }

    /// Tags recorded submissions with where they came from.
    pub fn with_source(mut self, source: SubmissionSource) -> Self {
        self.source = source;
        self
    }

    pub fn locks(&self) -> &FixtureLocks {
        &self.locks
    }

    pub async fn handle(&self, message: &InboundMessage) -> Result<ReportOutcome, ApplicationError> {
        let correlation_id = message.correlation_id.as_str();

        let Some(reporter) = self.resolve_identity(&message.sender).await? else {
            info!(
                event_name = "report.identity_unknown",
                correlation_id,
                "inbound message from unregistered phone"
            );
            self.emit(AuditEvent::new(
                None,
                correlation_id,
                "report.identity_unknown",
                AuditCategory::Ingress,
                ACTOR,
                AuditOutcome::Rejected,
            ));
            return Ok(ReportOutcome::UnknownIdentity);
        };

        let command = match self.parser.parse(&message.body) {
            Ok(command) => command,
            Err(failure) => {
                debug!(
                    event_name = "report.parse_failed",
                    correlation_id,
                    reason = %failure,
                    "could not parse inbound message"
                );
                self.emit(
                    AuditEvent::new(
                        None,
                        correlation_id,
                        "report.parse_failed",
                        AuditCategory::Ingress,
                        ACTOR,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("reason", failure.to_string()),
                );
                return Ok(ReportOutcome::ParseFailure(failure));
            }
        };

        match command {
            InboundCommand::Help => Ok(ReportOutcome::Help),
            InboundCommand::Status => self.status(&reporter).await,
            InboundCommand::Score(pair) => self.submit(&reporter, pair, correlation_id).await,
        }
    }

    /// Handles `message` and renders the reply text.
    pub async fn reply(&self, message: &InboundMessage) -> Result<String, ApplicationError> {
        Ok(self.handle(message).await?.reply())
    }

    async fn resolve_identity(&self, sender: &str) -> Result<Option<Identity>, ApplicationError> {
        let Some(phone) = PhoneNumber::normalize(sender) else {
            return Ok(None);
        };

        // The directory returns matches in a stable order; the first wins.
        let matches = self.stores.identities.find_by_phone(&phone).await?;
        if matches.len() > 1 {
            warn!(
                event_name = "report.identity_ambiguous",
                phone = %phone.masked(),
                matches = matches.len(),
                "several identities share a phone number, using the first"
            );
        }
        Ok(matches.into_iter().next())
    }

    pub async fn submit(
        &self,
        reporter: &Identity,
        pair: ScorePair,
        correlation_id: &str,
    ) -> Result<ReportOutcome, ApplicationError> {
        for attempt in 1..=MAX_LOCATE_ATTEMPTS {
            let located = match self.locate(reporter).await? {
                Ok(located) => located,
                Err(outcome) => return Ok(outcome),
            };

            let _guard = self.locks.acquire(&located.fixture.id).await;
            let mut unit = self.stores.ledger.begin().await?;

            let scoreline = pair.to_scoreline(located.side);
            let submission =
                Submission::new(&located.fixture, reporter, scoreline, self.source);
            let recorded = unit.record(submission).await?;

            if unit.is_scored(&located.fixture.id).await? {
                unit.rollback().await?;
                debug!(
                    event_name = "report.fixture_scored_concurrently",
                    correlation_id,
                    fixture_id = %located.fixture.id.0,
                    attempt,
                    "fixture was scored before the lock was taken, relocating"
                );
                continue;
            }

            let RecordOutcome::Recorded(submission) = recorded else {
                unit.rollback().await?;
                info!(
                    event_name = "report.duplicate_rejected",
                    correlation_id,
                    fixture_id = %located.fixture.id.0,
                    team_id = %reporter.team_id.0,
                    "team already has a live submission for this fixture"
                );
                self.emit(
                    AuditEvent::new(
                        Some(located.fixture.id.clone()),
                        correlation_id,
                        "report.duplicate_rejected",
                        AuditCategory::Ledger,
                        ACTOR,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("team_id", reporter.team_id.0.clone()),
                );
                return Ok(ReportOutcome::Duplicate { week: located.fixture.week });
            };

            return self.settle(unit, &located, submission, correlation_id).await;
        }

        warn!(
            event_name = "report.relocate_exhausted",
            correlation_id,
            attempts = MAX_LOCATE_ATTEMPTS,
            "every located fixture was scored concurrently"
        );
        Ok(ReportOutcome::AllFixturesScored)
    }

    /// Reconciles a freshly recorded submission against its counterpart and
    /// commits the unit.
    async fn settle(
        &self,
        mut unit: Box<dyn LedgerUnit>,
        located: &LocatedFixture,
        submission: Submission,
        correlation_id: &str,
    ) -> Result<ReportOutcome, ApplicationError> {
        let fixture = &located.fixture;
        let counterpart = unit.find_counterpart(&fixture.id, &submission.team_id).await?;
        let reconciliation = reconcile(&submission, counterpart.as_ref());
        let transition = self
            .engine
            .advance(counterpart.is_some(), &reconciliation)
            .map_err(DomainError::from)?;

        let outcome = match reconciliation {
            Reconciliation::Pending => {
                unit.commit().await?;
                ReportOutcome::Pending { week: fixture.week, scoreline: submission.scoreline }
            }
            Reconciliation::Resolved(result) => {
                self.finalize(unit.as_mut(), &result).await?;
                unit.commit().await?;
                ReportOutcome::Resolved { week: fixture.week, result }
            }
            Reconciliation::Conflict { .. } => {
                unit.commit().await?;
                ReportOutcome::Conflict { week: fixture.week }
            }
        };

        info!(
            event_name = "report.submission_recorded",
            correlation_id,
            fixture_id = %fixture.id.0,
            team_id = %submission.team_id.0,
            side = ?located.side,
            home = submission.scoreline.home,
            away = submission.scoreline.away,
            from = ?transition.from,
            to = ?transition.to,
            "submission reconciled"
        );
        self.emit(
            AuditEvent::new(
                Some(fixture.id.clone()),
                correlation_id,
                event_for(transition.to),
                audit_category(transition.to),
                ACTOR,
                AuditOutcome::Success,
            )
            .with_metadata("team_id", submission.team_id.0.clone())
            .with_metadata(
                "scoreline",
                format!("{}-{}", submission.scoreline.home, submission.scoreline.away),
            )
            .with_metadata("from", format!("{:?}", transition.from))
            .with_metadata("to", format!("{:?}", transition.to)),
        );

        Ok(outcome)
    }

    async fn finalize(
        &self,
        unit: &mut dyn LedgerUnit,
        result: &MatchResult,
    ) -> Result<(), ApplicationError> {
        if unit.commit_result(result).await? == CommitOutcome::AlreadyRecorded {
            return Err(DomainError::InvariantViolation(format!(
                "result already recorded for fixture {}",
                result.fixture_id.0
            ))
            .into());
        }
        unit.clear(&result.fixture_id).await?;
        Ok(())
    }

    pub async fn status(&self, reporter: &Identity) -> Result<ReportOutcome, ApplicationError> {
        let located = match self.locate(reporter).await? {
            Ok(located) => located,
            Err(outcome) => return Ok(outcome),
        };

        let mut unit = self.stores.ledger.begin().await?;
        let live = unit.live_submissions(&located.fixture.id).await?;
        let scored = unit.is_scored(&located.fixture.id).await?;
        unit.rollback().await?;

        let own = live.iter().find(|submission| submission.team_id == reporter.team_id);
        let status = match self.engine.observe(live.len(), scored) {
            FixtureState::Resolved => return Ok(ReportOutcome::AllFixturesScored),
            FixtureState::NoSubmissions => FixtureStatus::NoScoreYet,
            FixtureState::OneSubmission => match own {
                Some(own) => FixtureStatus::AwaitingOpponent(own.scoreline),
                None => FixtureStatus::OpponentReported,
            },
            FixtureState::Conflict => FixtureStatus::Conflict,
        };

        Ok(ReportOutcome::Status(StatusReport {
            fixture_id: located.fixture.id.clone(),
            week: located.fixture.week,
            status,
        }))
    }

    /// Re-runs reconciliation for every unscored fixture holding two live
    /// submissions. Covers reports that were recorded by separate processes
    /// and never observed each other. A failure on one fixture is logged and
    /// counted; the sweep moves on to the next.
    pub async fn reconcile_outstanding(&self) -> Result<SweepSummary, ApplicationError> {
        let correlation_id = format!("sweep-{}", Uuid::new_v4().simple());
        let contested = self.stores.ledger.contested_fixtures().await?;
        let mut summary = SweepSummary::default();

        for fixture in contested {
            summary.examined += 1;
            match self.sweep_fixture(&fixture.fixture_id, &correlation_id).await {
                Ok(SweepStep::Resolved) => summary.resolved += 1,
                Ok(SweepStep::Conflict) => summary.conflicts += 1,
                Ok(SweepStep::Skipped) => summary.skipped += 1,
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        event_name = "sweep.fixture_failed",
                        correlation_id = %correlation_id,
                        fixture_id = %fixture.fixture_id.0,
                        error = %error,
                        "could not reconcile contested fixture"
                    );
                    self.emit(
                        AuditEvent::new(
                            Some(fixture.fixture_id.clone()),
                            correlation_id.as_str(),
                            "sweep.fixture_failed",
                            AuditCategory::Reconciliation,
                            "reconciliation-sweep",
                            AuditOutcome::Failed,
                        )
                        .with_metadata("error", error.to_string()),
                    );
                }
            }
        }

        if summary.examined > 0 {
            info!(
                event_name = "sweep.completed",
                correlation_id = %correlation_id,
                examined = summary.examined,
                resolved = summary.resolved,
                conflicts = summary.conflicts,
                skipped = summary.skipped,
                failed = summary.failed,
                "reconciliation sweep finished"
            );
        }
        Ok(summary)
    }

    async fn sweep_fixture(
        &self,
        fixture_id: &FixtureId,
        correlation_id: &str,
    ) -> Result<SweepStep, ApplicationError> {
        let _guard = self.locks.acquire(fixture_id).await;
        let mut unit = self.stores.ledger.begin().await?;

        let live = unit.live_submissions(fixture_id).await?;
        let scored = unit.is_scored(fixture_id).await?;
        let (Some(first), Some(second)) = (live.first(), live.get(1)) else {
            unit.rollback().await?;
            return Ok(SweepStep::Skipped);
        };
        if scored || first.team_id == second.team_id {
            unit.rollback().await?;
            return Ok(SweepStep::Skipped);
        }

        let Reconciliation::Resolved(result) = reconcile(second, Some(first)) else {
            unit.rollback().await?;
            return Ok(SweepStep::Conflict);
        };

        self.finalize(unit.as_mut(), &result).await?;
        unit.commit().await?;

        info!(
            event_name = "sweep.result_committed",
            correlation_id,
            fixture_id = %fixture_id.0,
            home = result.scoreline.home,
            away = result.scoreline.away,
            "sweep resolved agreeing submissions"
        );
        self.emit(AuditEvent::new(
            Some(fixture_id.clone()),
            correlation_id,
            "sweep.result_committed",
            AuditCategory::Reconciliation,
            "reconciliation-sweep",
            AuditOutcome::Success,
        ));
        Ok(SweepStep::Resolved)
    }

    async fn locate(
        &self,
        reporter: &Identity,
    ) -> Result<Result<LocatedFixture, ReportOutcome>, ApplicationError> {
        let location = self
            .locator
            .locate(self.stores.fixtures.as_ref(), &reporter.team_id, &reporter.org_id)
            .await?;

        Ok(match location {
            Location::Found(located) => Ok(located),
            Location::NoEligibleFixture => Err(ReportOutcome::NoEligibleFixture),
            Location::AllFixturesScored => Err(ReportOutcome::AllFixturesScored),
        })
    }

    fn emit(&self, event: AuditEvent) {
        self.audit.emit(event);
    }
}

fn event_for(state: FixtureState) -> &'static str {
    match state {
        FixtureState::Resolved => "report.result_committed",
        FixtureState::Conflict => "report.conflict_flagged",
        FixtureState::NoSubmissions | FixtureState::OneSubmission => "report.submission_recorded",
    }
}

fn audit_category(state: FixtureState) -> AuditCategory {
    match state {
        FixtureState::Resolved | FixtureState::Conflict => AuditCategory::Reconciliation,
        FixtureState::NoSubmissions | FixtureState::OneSubmission => AuditCategory::Ledger,
    }
}
