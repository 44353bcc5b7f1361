use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::identity::{OrgId, TeamId};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonId(pub String);

/// Which side of a fixture a team plays on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// A scheduled match between two teams. Read-only to the reporting core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub week: u32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub org_id: OrgId,
    pub season_id: SeasonId,
    pub match_date: NaiveDate,
}

impl Fixture {
    pub fn side_of(&self, team_id: &TeamId) -> Option<Side> {
        if &self.home_team_id == team_id {
            Some(Side::Home)
        } else if &self.away_team_id == team_id {
            Some(Side::Away)
        } else {
            None
        }
    }
}

/// A fixture as returned by the schedule query, tagged with whether a result
/// has already been committed for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureCandidate {
    pub fixture: Fixture,
    pub has_result: bool,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Fixture, FixtureId, SeasonId, Side};
    use crate::domain::identity::{OrgId, TeamId};

    fn fixture() -> Fixture {
        Fixture {
            id: FixtureId("FX-1".to_string()),
            week: 3,
            home_team_id: TeamId("team-hawks".to_string()),
            away_team_id: TeamId("team-owls".to_string()),
            org_id: OrgId("org-1".to_string()),
            season_id: SeasonId("season-2026".to_string()),
            match_date: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        }
    }

    #[test]
    fn side_of_resolves_both_participants() {
        let fixture = fixture();
        assert_eq!(fixture.side_of(&TeamId("team-hawks".to_string())), Some(Side::Home));
        assert_eq!(fixture.side_of(&TeamId("team-owls".to_string())), Some(Side::Away));
        assert_eq!(fixture.side_of(&TeamId("team-crows".to_string())), None);
    }
}
