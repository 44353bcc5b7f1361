//! Canned reply text. Nothing outside this module produces user-facing copy.

use crate::domain::score::Scoreline;
use crate::reporting::{FixtureStatus, ReportOutcome, StatusReport};

pub const UNKNOWN_IDENTITY: &str = "Phone not registered. Contact league admin.";
pub const HELP: &str = "Send score as '3-2'. Commands: help, status";
pub const PARSE_FAILURE: &str = "Could not parse. Send as '3-2'";
pub const NO_ELIGIBLE_FIXTURE: &str = "No matches found.";
pub const ALL_FIXTURES_SCORED: &str = "All matches scored. Contact admin.";
pub const CONFLICT: &str = "Submitted but conflict. Admin will review.";

pub fn render(outcome: &ReportOutcome) -> String {
    match outcome {
        ReportOutcome::UnknownIdentity => UNKNOWN_IDENTITY.to_owned(),
        ReportOutcome::Help => HELP.to_owned(),
        ReportOutcome::ParseFailure(_) => PARSE_FAILURE.to_owned(),
        ReportOutcome::NoEligibleFixture => NO_ELIGIBLE_FIXTURE.to_owned(),
        ReportOutcome::AllFixturesScored => ALL_FIXTURES_SCORED.to_owned(),
        ReportOutcome::Duplicate { week } => format!("Already submitted for Week {week}"),
        ReportOutcome::Resolved { week, result } => {
            format!("Confirmed! Week {week}: {} Final!", away_first(result.scoreline))
        }
        ReportOutcome::Conflict { .. } => CONFLICT.to_owned(),
        ReportOutcome::Pending { week, scoreline } => {
            format!("Submitted Week {week}: {}. Waiting for opponent.", away_first(*scoreline))
        }
        ReportOutcome::Status(report) => render_status(report),
    }
}

fn render_status(report: &StatusReport) -> String {
    let week = report.week;
    match report.status {
        FixtureStatus::NoScoreYet => format!("Week {week}: no score yet. Send as '3-2'"),
        FixtureStatus::AwaitingOpponent(scoreline) => {
            format!("Week {week}: you sent {}. Waiting for opponent.", away_first(scoreline))
        }
        FixtureStatus::OpponentReported => {
            format!("Week {week}: opponent has reported. Send your score as '3-2'")
        }
        FixtureStatus::Conflict => format!("Week {week}: scores conflict. Admin will review."),
    }
}

// Replies print the away score first.
fn away_first(scoreline: Scoreline) -> String {
    format!("{}-{}", scoreline.away, scoreline.home)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::render;
    use crate::command::ParseFailure;
    use crate::domain::fixture::{FixtureId, SeasonId};
    use crate::domain::identity::OrgId;
    use crate::domain::match_result::MatchResult;
    use crate::domain::score::Scoreline;
    use crate::reporting::{FixtureStatus, ReportOutcome, StatusReport};

    fn status(status: FixtureStatus) -> ReportOutcome {
        ReportOutcome::Status(StatusReport {
            fixture_id: FixtureId("FX-4".to_owned()),
            week: 4,
            status,
        })
    }

    #[test]
    fn fixed_replies_match_the_published_copy() {
        assert_eq!(render(&ReportOutcome::UnknownIdentity), "Phone not registered. Contact league admin.");
        assert_eq!(render(&ReportOutcome::Help), "Send score as '3-2'. Commands: help, status");
        assert_eq!(
            render(&ReportOutcome::ParseFailure(ParseFailure::NoScorePair)),
            "Could not parse. Send as '3-2'"
        );
        assert_eq!(render(&ReportOutcome::NoEligibleFixture), "No matches found.");
        assert_eq!(render(&ReportOutcome::AllFixturesScored), "All matches scored. Contact admin.");
        assert_eq!(render(&ReportOutcome::Duplicate { week: 6 }), "Already submitted for Week 6");
        assert_eq!(
            render(&ReportOutcome::Conflict { week: 6 }),
            "Submitted but conflict. Admin will review."
        );
    }

    #[test]
    fn scored_replies_print_away_score_first() {
        let scoreline = Scoreline { home: 3, away: 2 };
        assert_eq!(
            render(&ReportOutcome::Pending { week: 9, scoreline }),
            "Submitted Week 9: 2-3. Waiting for opponent."
        );

        let result = MatchResult {
            fixture_id: FixtureId("FX-9".to_owned()),
            scoreline,
            org_id: OrgId("org".to_owned()),
            season_id: SeasonId("season".to_owned()),
            recorded_at: Utc::now(),
        };
        assert_eq!(
            render(&ReportOutcome::Resolved { week: 9, result }),
            "Confirmed! Week 9: 2-3 Final!"
        );
    }

    #[test]
    fn status_replies_describe_fixture_state() {
        assert_eq!(render(&status(FixtureStatus::NoScoreYet)), "Week 4: no score yet. Send as '3-2'");
        assert_eq!(
            render(&status(FixtureStatus::AwaitingOpponent(Scoreline { home: 1, away: 4 }))),
            "Week 4: you sent 4-1. Waiting for opponent."
        );
        assert_eq!(
            render(&status(FixtureStatus::OpponentReported)),
            "Week 4: opponent has reported. Send your score as '3-2'"
        );
        assert_eq!(
            render(&status(FixtureStatus::Conflict)),
            "Week 4: scores conflict. Admin will review."
        );
    }
}
