use scoreline_core::domain::submission::Submission;
use scoreline_core::ledger::ContestedFixture;
use scoreline_core::reconciliation::{reconcile, Reconciliation};
use scoreline_db::SqlSubmissionLedger;

use crate::commands::{load_config, open_database, runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("conflicts") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("conflicts") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let contested = SqlSubmissionLedger::new(pool.clone())
            .contested()
            .await
            .map_err(|error| ("ledger_query", error.to_string(), 5u8));
        pool.close().await;
        contested
    });

    match result {
        Ok(contested) => {
            let conflicts: Vec<&ContestedFixture> =
                contested.iter().filter(|fixture| is_conflict(fixture)).collect();
            CommandResult::success("conflicts", render(&conflicts))
        }
        Err(failure) => CommandResult::from_step("conflicts", failure),
    }
}

/// Agreeing pairs are left for the sweep; only disagreements need an admin.
fn is_conflict(fixture: &ContestedFixture) -> bool {
    match (fixture.submissions.first(), fixture.submissions.get(1)) {
        (Some(first), Some(second)) => {
            matches!(reconcile(second, Some(first)), Reconciliation::Conflict { .. })
        }
        _ => false,
    }
}

fn render(conflicts: &[&ContestedFixture]) -> String {
    if conflicts.is_empty() {
        return "no conflicting submissions".to_string();
    }

    let mut lines = vec![format!("{} fixtures awaiting admin review:", conflicts.len())];
    for fixture in conflicts {
        let reports =
            fixture.submissions.iter().map(describe_submission).collect::<Vec<_>>().join("; ");
        lines.push(format!("  - {}: {reports}", fixture.fixture_id.0));
    }
    lines.join("\n")
}

fn describe_submission(submission: &Submission) -> String {
    format!(
        "{} reported home {} away {}",
        submission.team_id.0, submission.scoreline.home, submission.scoreline.away
    )
}
