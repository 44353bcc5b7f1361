use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;

use scoreline_core::domain::fixture::{Fixture, FixtureCandidate, FixtureId, SeasonId};
use scoreline_core::domain::identity::{OrgId, TeamId};
use scoreline_core::errors::StoreError;
use scoreline_core::store::FixtureStore;

use super::{decode_error, RepositoryError};
use crate::DbPool;

pub struct SqlFixtureRepository {
    pool: DbPool,
}

impl SqlFixtureRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn recent_for_team(
        &self,
        team_id: &TeamId,
        org_id: &OrgId,
        limit: u32,
    ) -> Result<Vec<FixtureCandidate>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT s.id, s.week_number, s.home_team_id, s.away_team_id, s.org_id, s.season_id,
                    s.match_date,
                    EXISTS(SELECT 1 FROM match_result r WHERE r.schedule_id = s.id) AS has_result
             FROM schedule s
             WHERE s.org_id = ?1
               AND (s.home_team_id = ?2 OR s.away_team_id = ?2)
               AND s.is_bye = 0
             ORDER BY s.match_date DESC, s.id ASC
             LIMIT ?3",
        )
        .bind(&org_id.0)
        .bind(&team_id.0)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_candidate).collect()
    }
}

fn row_to_candidate(row: &sqlx::sqlite::SqliteRow) -> Result<FixtureCandidate, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let week: i64 = row.try_get("week_number").map_err(decode_error)?;
    let away_team_id: Option<String> = row.try_get("away_team_id").map_err(decode_error)?;
    let match_date: String = row.try_get("match_date").map_err(decode_error)?;
    let has_result: i64 = row.try_get("has_result").map_err(decode_error)?;

    let away_team_id = away_team_id
        .ok_or_else(|| RepositoryError::Decode(format!("fixture `{id}` has no away team")))?;
    let week = u32::try_from(week)
        .map_err(|_| RepositoryError::Decode(format!("fixture `{id}` has week {week}")))?;
    let match_date = NaiveDate::parse_from_str(&match_date, "%Y-%m-%d").map_err(decode_error)?;

    Ok(FixtureCandidate {
        fixture: Fixture {
            id: FixtureId(id),
            week,
            home_team_id: TeamId(row.try_get("home_team_id").map_err(decode_error)?),
            away_team_id: TeamId(away_team_id),
            org_id: OrgId(row.try_get("org_id").map_err(decode_error)?),
            season_id: SeasonId(row.try_get("season_id").map_err(decode_error)?),
            match_date,
        },
        has_result: has_result != 0,
    })
}

#[async_trait]
impl FixtureStore for SqlFixtureRepository {
    async fn recent_fixtures(
        &self,
        team_id: &TeamId,
        org_id: &OrgId,
        limit: u32,
    ) -> Result<Vec<FixtureCandidate>, StoreError> {
        Ok(self.recent_for_team(team_id, org_id, limit).await?)
    }
}
