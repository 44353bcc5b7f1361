use serde::Serialize;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const SEED_USER_IDS: &[&str] =
    &["user-hawks-captain", "user-owls-captain", "user-crows-captain", "user-foxes-captain"];

const SEED_SCHEDULE_IDS: &[&str] = &[
    "sched-w1-hawks-owls",
    "sched-w1-crows-foxes",
    "sched-w2-owls-crows",
    "sched-w2-foxes-hawks",
    "sched-w3-hawks-crows",
    "sched-w3-owls-foxes",
    "sched-w4-hawks-bye",
    "sched-w4-crows-bye",
    "sched-w4-foxes-owls",
];

const SEED_RESULT_IDS: &[&str] = &["sched-w1-hawks-owls", "sched-w1-crows-foxes"];

/// A small deterministic league for local runs and `scoreline simulate`:
/// four teams in one org, week 1 already scored, weeks 2 to 4 open.
pub struct DemoLeague;

impl DemoLeague {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_league.sql");

    pub const ORG_ID: &str = "org-riverside";

    /// Applies the seed. Rows that already exist are left alone, so loading
    /// twice is harmless.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(SeedResult {
            org_id: Self::ORG_ID,
            users: SEED_USER_IDS.len(),
            fixtures: SEED_SCHEDULE_IDS.len(),
            results: SEED_RESULT_IDS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let checks = vec![
            ("league-users", count_present(pool, "league_user", "id", SEED_USER_IDS).await?),
            ("schedule", count_present(pool, "schedule", "id", SEED_SCHEDULE_IDS).await?),
            (
                "match-results",
                count_present(pool, "match_result", "schedule_id", SEED_RESULT_IDS).await?,
            ),
        ];
        let all_present = checks.iter().all(|(_, present)| *present);

        Ok(VerificationResult { all_present, checks })
    }

    /// Removes everything the seed created, including submissions reported
    /// against seeded fixtures.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let schedule_ids = sql_array_from_ids(SEED_SCHEDULE_IDS);
        let user_ids = sql_array_from_ids(SEED_USER_IDS);

        let mut tx = pool.begin().await?;
        for statement in [
            format!("DELETE FROM score_submission WHERE schedule_id IN {schedule_ids}"),
            format!("DELETE FROM match_result WHERE schedule_id IN {schedule_ids}"),
            format!("DELETE FROM schedule WHERE id IN {schedule_ids}"),
            format!("DELETE FROM league_user WHERE id IN {user_ids}"),
        ] {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn count_present(
    pool: &DbPool,
    table: &str,
    column: &str,
    ids: &[&str],
) -> Result<bool, RepositoryError> {
    let quoted = sql_array_from_ids(ids);
    let present: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {table} WHERE {column} IN {quoted}"))
            .fetch_one(pool)
            .await?;
    Ok(present == ids.len() as i64)
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{id}'")).collect::<Vec<_>>().join(", ");
    format!("({quoted})")
}

#[derive(Clone, Debug, Serialize)]
pub struct SeedResult {
    pub org_id: &'static str,
    pub users: usize,
    pub fixtures: usize,
    pub results: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
