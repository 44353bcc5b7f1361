use crate::domain::fixture::{Fixture, FixtureCandidate, Side};
use crate::domain::identity::{OrgId, TeamId};
use crate::errors::StoreError;
use crate::store::FixtureStore;

pub const DEFAULT_FIXTURE_WINDOW: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedFixture {
    pub fixture: Fixture,
    pub side: Side,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Found(LocatedFixture),
    NoEligibleFixture,
    AllFixturesScored,
}

/// Finds the fixture a team is most likely reporting on: the newest fixture,
/// within a bounded window of recent ones, that has no result yet.
#[derive(Clone, Copy, Debug)]
pub struct FixtureLocator {
    window: u32,
}

impl Default for FixtureLocator {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_WINDOW)
    }
}

impl FixtureLocator {
    pub fn new(window: u32) -> Self {
        Self { window: window.max(1) }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub async fn locate(
        &self,
        store: &dyn FixtureStore,
        team_id: &TeamId,
        org_id: &OrgId,
    ) -> Result<Location, StoreError> {
        let candidates = store.recent_fixtures(team_id, org_id, self.window).await?;
        Ok(self.select(candidates, team_id))
    }

    /// Walks candidates in store order (newest first) and picks the first
    /// unscored one. Ties on date were already broken by the store.
    pub fn select(&self, candidates: Vec<FixtureCandidate>, team_id: &TeamId) -> Location {
        let mut eligible = candidates
            .into_iter()
            .filter_map(|candidate| {
                let side = candidate.fixture.side_of(team_id)?;
                Some((candidate, side))
            })
            .take(self.window as usize)
            .peekable();

        if eligible.peek().is_none() {
            return Location::NoEligibleFixture;
        }

        eligible
            .find(|(candidate, _)| !candidate.has_result)
            .map(|(candidate, side)| {
                Location::Found(LocatedFixture { fixture: candidate.fixture, side })
            })
            .unwrap_or(Location::AllFixturesScored)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{FixtureLocator, LocatedFixture, Location};
    use crate::domain::fixture::{Fixture, FixtureCandidate, FixtureId, SeasonId, Side};
    use crate::domain::identity::{OrgId, TeamId};
    use crate::store::InMemoryLeague;

    fn team(id: &str) -> TeamId {
        TeamId(id.to_string())
    }

    fn fixture(id: &str, day: u32, home: &str, away: &str) -> Fixture {
        Fixture {
            id: FixtureId(id.to_string()),
            week: day,
            home_team_id: team(home),
            away_team_id: team(away),
            org_id: OrgId("org-1".to_string()),
            season_id: SeasonId("s-1".to_string()),
            match_date: NaiveDate::from_ymd_opt(2026, 5, day).expect("valid date"),
        }
    }

    fn candidate(fixture: Fixture, has_result: bool) -> FixtureCandidate {
        FixtureCandidate { fixture, has_result }
    }

    #[test]
    fn empty_candidate_set_means_no_eligible_fixture() {
        let locator = FixtureLocator::default();
        assert_eq!(locator.select(Vec::new(), &team("team-a")), Location::NoEligibleFixture);
    }

    #[test]
    fn all_scored_candidates_mean_all_fixtures_scored() {
        let locator = FixtureLocator::default();
        let candidates = vec![
            candidate(fixture("FX-2", 2, "team-a", "team-b"), true),
            candidate(fixture("FX-1", 1, "team-c", "team-a"), true),
        ];
        assert_eq!(locator.select(candidates, &team("team-a")), Location::AllFixturesScored);
    }

    #[test]
    fn picks_first_unscored_and_reports_side() {
        let locator = FixtureLocator::default();
        let unscored = fixture("FX-2", 2, "team-c", "team-a");
        let candidates = vec![
            candidate(fixture("FX-3", 3, "team-a", "team-b"), true),
            candidate(unscored.clone(), false),
            candidate(fixture("FX-1", 1, "team-a", "team-d"), false),
        ];

        assert_eq!(
            locator.select(candidates, &team("team-a")),
            Location::Found(LocatedFixture { fixture: unscored, side: Side::Away })
        );
    }

    #[test]
    fn window_bounds_how_far_back_the_walk_goes() {
        let locator = FixtureLocator::new(2);
        let candidates = vec![
            candidate(fixture("FX-3", 3, "team-a", "team-b"), true),
            candidate(fixture("FX-2", 2, "team-a", "team-c"), true),
            candidate(fixture("FX-1", 1, "team-a", "team-d"), false),
        ];
        assert_eq!(locator.select(candidates, &team("team-a")), Location::AllFixturesScored);
    }

    #[test]
    fn zero_window_is_clamped_to_one() {
        assert_eq!(FixtureLocator::new(0).window(), 1);
    }

    #[tokio::test]
    async fn locate_queries_store_with_configured_window() {
        let league = InMemoryLeague::new();
        for day in 1..=4 {
            league.schedule(fixture(&format!("FX-{day}"), day, "team-a", "team-b")).await;
        }

        let location = FixtureLocator::new(3)
            .locate(&league, &team("team-a"), &OrgId("org-1".to_string()))
            .await
            .expect("locate");

        let Location::Found(located) = location else {
            panic!("expected a fixture, got {location:?}");
        };
        assert_eq!(located.fixture.id.0, "FX-4");
        assert_eq!(located.side, Side::Home);
    }
}
