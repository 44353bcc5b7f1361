use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::fixture::{Fixture, FixtureId, SeasonId};
use crate::domain::identity::{Identity, OrgId, TeamId, UserId};
use crate::domain::score::Scoreline;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionSource {
    Sms,
    Simulation,
}

impl SubmissionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Simulation => "simulation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sms" => Some(Self::Sms),
            "simulation" => Some(Self::Simulation),
            _ => None,
        }
    }
}

/// One team's pending report for a fixture, already mapped to home/away.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub fixture_id: FixtureId,
    pub team_id: TeamId,
    pub user_id: UserId,
    pub scoreline: Scoreline,
    pub org_id: OrgId,
    pub season_id: SeasonId,
    pub source: SubmissionSource,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        fixture: &Fixture,
        reporter: &Identity,
        scoreline: Scoreline,
        source: SubmissionSource,
    ) -> Self {
        Self {
            id: SubmissionId(format!("SUB-{}", Uuid::new_v4().simple())),
            fixture_id: fixture.id.clone(),
            team_id: reporter.team_id.clone(),
            user_id: reporter.user_id.clone(),
            scoreline,
            org_id: reporter.org_id.clone(),
            season_id: fixture.season_id.clone(),
            source,
            created_at: Utc::now(),
        }
    }
}
