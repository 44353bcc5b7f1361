//! Read-side collaborator contracts: who is texting, and which fixtures they
//! could be reporting on. Implementations live in `scoreline-db`; an
//! in-memory implementation of every contract lives in [`memory`].

use async_trait::async_trait;

use crate::domain::fixture::FixtureCandidate;
use crate::domain::identity::{Identity, OrgId, PhoneNumber, TeamId};
use crate::errors::StoreError;

pub mod memory;

pub use memory::InMemoryLeague;

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Every identity registered under `phone`, in the store's deterministic
    /// tie-break order. Callers treat the first entry as authoritative.
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Vec<Identity>, StoreError>;
}

#[async_trait]
pub trait FixtureStore: Send + Sync {
    /// Non-bye fixtures in `org_id` where `team_id` plays either side, newest
    /// `match_date` first, at most `limit` entries.
    async fn recent_fixtures(
        &self,
        team_id: &TeamId,
        org_id: &OrgId,
        limit: u32,
    ) -> Result<Vec<FixtureCandidate>, StoreError>;
}
