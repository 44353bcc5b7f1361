use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::fixture::{FixtureId, SeasonId};
use crate::domain::identity::OrgId;
use crate::domain::score::Scoreline;
use crate::domain::submission::Submission;

/// The agreed, final score of a fixture. Exists at most once per fixture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub fixture_id: FixtureId,
    pub scoreline: Scoreline,
    pub org_id: OrgId,
    pub season_id: SeasonId,
    pub recorded_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn from_submission(submission: &Submission) -> Self {
        Self {
            fixture_id: submission.fixture_id.clone(),
            scoreline: submission.scoreline,
            org_id: submission.org_id.clone(),
            season_id: submission.season_id.clone(),
            recorded_at: Utc::now(),
        }
    }
}
