use std::sync::Arc;

use thiserror::Error;

use scoreline_core::errors::StoreError;
use scoreline_core::reporting::ReportingStores;

use crate::DbPool;

pub mod fixture;
pub mod identity;
pub mod ledger;

pub use fixture::SqlFixtureRepository;
pub use identity::SqlIdentityRepository;
pub use ledger::{SqlLedgerUnit, SqlSubmissionLedger};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => StoreError::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => StoreError::Malformed(message),
        }
    }
}

pub(crate) fn decode_error(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

/// SQL-backed collaborators for a `ScoreReporter`, all sharing `pool`.
pub fn reporting_stores(pool: &DbPool) -> ReportingStores {
    ReportingStores {
        identities: Arc::new(SqlIdentityRepository::new(pool.clone())),
        fixtures: Arc::new(SqlFixtureRepository::new(pool.clone())),
        ledger: Arc::new(SqlSubmissionLedger::new(pool.clone())),
    }
}
