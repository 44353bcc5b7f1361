use scoreline_core::domain::submission::SubmissionSource;
use scoreline_core::locator::FixtureLocator;
use scoreline_core::reporting::{InboundMessage, ScoreReporter};
use scoreline_db::reporting_stores;

use crate::commands::{load_config, open_database, runtime, CommandResult};

/// Feeds one message through the same reporter the server uses. Nothing is
/// sent; the reply is printed instead.
pub fn run(from: &str, body: &str) -> CommandResult {
    let config = match load_config("simulate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("simulate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let message = InboundMessage::new(from, body);
    let correlation_id = message.correlation_id.clone();

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let reporter = ScoreReporter::new(reporting_stores(&pool))
            .with_locator(FixtureLocator::new(config.reporting.fixture_window))
            .with_source(SubmissionSource::Simulation);

        let outcome = reporter.handle(&message).await.map_err(|error| {
            let interface_error = error.into_interface(correlation_id.clone());
            ("reporting", format!("{} ({interface_error})", interface_error.user_message()), 5u8)
        });

        pool.close().await;
        outcome
    });

    match result {
        Ok(outcome) => CommandResult::success("simulate", outcome.reply()),
        Err(failure) => CommandResult::from_step("simulate", failure),
    }
}
