use scoreline_core::locator::FixtureLocator;
use scoreline_core::reporting::{ScoreReporter, SweepSummary};
use scoreline_db::reporting_stores;

use crate::commands::{load_config, open_database, runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("sweep") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("sweep") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let reporter = ScoreReporter::new(reporting_stores(&pool))
            .with_locator(FixtureLocator::new(config.reporting.fixture_window));
        let summary = reporter
            .reconcile_outstanding()
            .await
            .map_err(|error| ("sweep_execution", error.to_string(), 5u8));
        pool.close().await;
        summary
    });

    match result {
        Ok(summary) if summary.failed > 0 => {
            CommandResult::failure("sweep", "sweep_partial", describe(&summary), 5)
        }
        Ok(summary) => CommandResult::success("sweep", describe(&summary)),
        Err(failure) => CommandResult::from_step("sweep", failure),
    }
}

fn describe(summary: &SweepSummary) -> String {
    format!(
        "examined {} contested fixtures: {} resolved, {} still in conflict, {} skipped, {} failed",
        summary.examined, summary.resolved, summary.conflicts, summary.skipped, summary.failed
    )
}
