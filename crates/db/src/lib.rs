pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod seed;

pub use connection::{connect, connect_with_config, connect_with_settings, ping, DbPool};
pub use repositories::{
    reporting_stores, RepositoryError, SqlFixtureRepository, SqlIdentityRepository,
    SqlSubmissionLedger,
};
pub use seed::{DemoLeague, SeedResult, VerificationResult};
