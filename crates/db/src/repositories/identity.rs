use async_trait::async_trait;
use sqlx::Row;

use scoreline_core::domain::identity::{Identity, OrgId, PhoneNumber, TeamId, UserId};
use scoreline_core::errors::StoreError;
use scoreline_core::store::IdentityDirectory;

use super::{decode_error, RepositoryError};
use crate::DbPool;

pub struct SqlIdentityRepository {
    pool: DbPool,
}

impl SqlIdentityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_matches(&self, phone: &PhoneNumber) -> Result<Vec<Identity>, RepositoryError> {
        // Stored numbers may carry a country code or punctuation, so the LIKE
        // only narrows candidates. A match requires the stored number's
        // normalized key to equal the sender's.
        let rows = sqlx::query(
            "SELECT id, username, phone, team_id, org_id
             FROM league_user
             WHERE replace(replace(replace(replace(replace(phone, ' ', ''), '-', ''), '(', ''), ')', ''), '.', '')
                   LIKE '%' || ?1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(phone.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut matches = Vec::with_capacity(rows.len());
        for row in &rows {
            let identity = row_to_identity(row)?;
            if &identity.phone == phone {
                matches.push(identity);
            }
        }
        Ok(matches)
    }
}

fn row_to_identity(row: &sqlx::sqlite::SqliteRow) -> Result<Identity, RepositoryError> {
    let raw_phone: String = row.try_get("phone").map_err(decode_error)?;
    let phone = PhoneNumber::normalize(&raw_phone)
        .ok_or_else(|| RepositoryError::Decode(format!("stored phone `{raw_phone}` has no digits")))?;

    Ok(Identity {
        user_id: UserId(row.try_get("id").map_err(decode_error)?),
        username: row.try_get("username").map_err(decode_error)?,
        phone,
        team_id: TeamId(row.try_get("team_id").map_err(decode_error)?),
        org_id: OrgId(row.try_get("org_id").map_err(decode_error)?),
    })
}

#[async_trait]
impl IdentityDirectory for SqlIdentityRepository {
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Vec<Identity>, StoreError> {
        Ok(self.find_matches(phone).await?)
    }
}
