use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, Sqlite, Transaction};

use scoreline_core::domain::fixture::{FixtureId, SeasonId};
use scoreline_core::domain::identity::{OrgId, TeamId, UserId};
use scoreline_core::domain::match_result::MatchResult;
use scoreline_core::domain::score::Scoreline;
use scoreline_core::domain::submission::{Submission, SubmissionId, SubmissionSource};
use scoreline_core::errors::StoreError;
use scoreline_core::ledger::{
    CommitOutcome, ContestedFixture, LedgerUnit, RecordOutcome, SubmissionLedger,
};

use super::{decode_error, RepositoryError};
use crate::DbPool;

const SUBMISSION_COLUMNS: &str = "id, schedule_id, submitted_by_team_id, submitted_by_user_id, \
     home_score, away_score, org_id, season_id, source, created_at";

pub struct SqlSubmissionLedger {
    pool: DbPool,
}

impl SqlSubmissionLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn contested(&self) -> Result<Vec<ContestedFixture>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SUBMISSION_COLUMNS}
             FROM score_submission sub
             WHERE NOT EXISTS (SELECT 1 FROM match_result r WHERE r.schedule_id = sub.schedule_id)
               AND sub.schedule_id IN (
                   SELECT schedule_id FROM score_submission
                   GROUP BY schedule_id HAVING COUNT(*) >= 2
               )
             ORDER BY sub.schedule_id ASC, sub.created_at ASC, sub.id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: BTreeMap<FixtureId, Vec<Submission>> = BTreeMap::new();
        for row in &rows {
            let submission = row_to_submission(row)?;
            grouped.entry(submission.fixture_id.clone()).or_default().push(submission);
        }

        Ok(grouped
            .into_iter()
            .map(|(fixture_id, submissions)| ContestedFixture { fixture_id, submissions })
            .collect())
    }
}

#[async_trait]
impl SubmissionLedger for SqlSubmissionLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, StoreError> {
        let tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        Ok(Box::new(SqlLedgerUnit { tx }))
    }

    async fn contested_fixtures(&self) -> Result<Vec<ContestedFixture>, StoreError> {
        Ok(self.contested().await?)
    }
}

/// One SQLite transaction. Dropping it without `commit` rolls back.
pub struct SqlLedgerUnit {
    tx: Transaction<'static, Sqlite>,
}

impl SqlLedgerUnit {
    async fn insert_submission(
        &mut self,
        submission: &Submission,
    ) -> Result<bool, RepositoryError> {
        let inserted = sqlx::query(&format!(
            "INSERT INTO score_submission ({SUBMISSION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (schedule_id, submitted_by_team_id) DO NOTHING"
        ))
        .bind(&submission.id.0)
        .bind(&submission.fixture_id.0)
        .bind(&submission.team_id.0)
        .bind(&submission.user_id.0)
        .bind(i64::from(submission.scoreline.home))
        .bind(i64::from(submission.scoreline.away))
        .bind(&submission.org_id.0)
        .bind(&submission.season_id.0)
        .bind(submission.source.as_str())
        .bind(timestamp(&submission.created_at))
        .execute(&mut *self.tx)
        .await?;

        Ok(inserted.rows_affected() == 1)
    }

    async fn select_submissions(
        &mut self,
        fixture_id: &FixtureId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SUBMISSION_COLUMNS}
             FROM score_submission
             WHERE schedule_id = ?1
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(&fixture_id.0)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(row_to_submission).collect()
    }

    async fn insert_result(&mut self, result: &MatchResult) -> Result<bool, RepositoryError> {
        let inserted = sqlx::query(
            "INSERT INTO match_result
                (schedule_id, home_score, away_score, org_id, season_id, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (schedule_id) DO NOTHING",
        )
        .bind(&result.fixture_id.0)
        .bind(i64::from(result.scoreline.home))
        .bind(i64::from(result.scoreline.away))
        .bind(&result.org_id.0)
        .bind(&result.season_id.0)
        .bind(timestamp(&result.recorded_at))
        .execute(&mut *self.tx)
        .await?;

        Ok(inserted.rows_affected() == 1)
    }
}

#[async_trait]
impl LedgerUnit for SqlLedgerUnit {
    async fn record(&mut self, submission: Submission) -> Result<RecordOutcome, StoreError> {
        if self.insert_submission(&submission).await? {
            Ok(RecordOutcome::Recorded(submission))
        } else {
            Ok(RecordOutcome::Duplicate)
        }
    }

    async fn find_counterpart(
        &mut self,
        fixture_id: &FixtureId,
        excluding_team: &TeamId,
    ) -> Result<Option<Submission>, StoreError> {
        let live = self.select_submissions(fixture_id).await?;
        Ok(live.into_iter().find(|submission| &submission.team_id != excluding_team))
    }

    async fn live_submissions(
        &mut self,
        fixture_id: &FixtureId,
    ) -> Result<Vec<Submission>, StoreError> {
        Ok(self.select_submissions(fixture_id).await?)
    }

    async fn is_scored(&mut self, fixture_id: &FixtureId) -> Result<bool, StoreError> {
        let scored: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM match_result WHERE schedule_id = ?1)")
                .bind(&fixture_id.0)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(RepositoryError::from)?;
        Ok(scored != 0)
    }

    async fn commit_result(&mut self, result: &MatchResult) -> Result<CommitOutcome, StoreError> {
        if self.insert_result(result).await? {
            Ok(CommitOutcome::Committed)
        } else {
            Ok(CommitOutcome::AlreadyRecorded)
        }
    }

    async fn clear(&mut self, fixture_id: &FixtureId) -> Result<u64, StoreError> {
        let deleted = sqlx::query("DELETE FROM score_submission WHERE schedule_id = ?1")
            .bind(&fixture_id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::from)?;
        Ok(deleted.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(RepositoryError::from)?;
        Ok(())
    }
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> Result<Submission, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let home: i64 = row.try_get("home_score").map_err(decode_error)?;
    let away: i64 = row.try_get("away_score").map_err(decode_error)?;
    let source: String = row.try_get("source").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;

    let scoreline = Scoreline::new(score_column(&id, home)?, score_column(&id, away)?)
        .map_err(decode_error)?;
    let source = SubmissionSource::parse(&source).ok_or_else(|| {
        RepositoryError::Decode(format!("submission `{id}` has unknown source `{source}`"))
    })?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|value| value.with_timezone(&Utc))
        .map_err(decode_error)?;

    Ok(Submission {
        id: SubmissionId(id),
        fixture_id: FixtureId(row.try_get("schedule_id").map_err(decode_error)?),
        team_id: TeamId(row.try_get("submitted_by_team_id").map_err(decode_error)?),
        user_id: UserId(row.try_get("submitted_by_user_id").map_err(decode_error)?),
        scoreline,
        org_id: OrgId(row.try_get("org_id").map_err(decode_error)?),
        season_id: SeasonId(row.try_get("season_id").map_err(decode_error)?),
        source,
        created_at,
    })
}

fn score_column(id: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("submission `{id}` has score {value}")))
}
