use std::sync::Arc;

use scoreline_core::config::{AppConfig, ConfigError, LoadOptions};
use scoreline_core::locator::FixtureLocator;
use scoreline_core::reporting::ScoreReporter;
use scoreline_db::{connect_with_config, migrations, reporting_stores, DbPool};
use scoreline_sms::{sender_from_config, DeliveryError, SmsSender};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub reporter: ScoreReporter,
    pub sender: Arc<dyn SmsSender>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("sms delivery setup failed: {0}")]
    Delivery(#[from] DeliveryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let sender = sender_from_config(&config.sms)?;
    let reporter = ScoreReporter::new(reporting_stores(&db_pool))
        .with_locator(FixtureLocator::new(config.reporting.fixture_window));
    info!(
        event_name = "system.bootstrap.reporter_ready",
        correlation_id = "bootstrap",
        sms_delivery = sender.name(),
        fixture_window = config.reporting.fixture_window,
        audit_sink = reporter.audit_sink_name(),
        "score reporter initialized"
    );

    Ok(Application { config, db_pool, reporter, sender })
}

#[cfg(test)]
mod tests {
    use scoreline_core::config::{ConfigOverrides, LoadOptions, SmsDelivery};
    use scoreline_core::reporting::InboundMessage;
    use scoreline_db::DemoLeague;

    use crate::bootstrap::bootstrap;

    fn overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                sms_delivery: Some(SmsDelivery::Disabled),
                fixture_window: Some(3),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_twilio_lacks_credentials() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                sms_delivery: Some(SmsDelivery::Twilio),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("sms.account_sid"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_wires_a_working_reporter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("bootstrap.db").display());
        let app = bootstrap(overrides(&url)).await.expect("bootstrap");
        assert_eq!(app.config.reporting.fixture_window, 3);
        assert_eq!(app.sender.name(), "disabled");

        DemoLeague::load(&app.db_pool).await.expect("seed");
        let reply = app
            .reporter
            .reply(&InboundMessage::new("+15550100001", "help"))
            .await
            .expect("reply");
        assert!(reply.contains("3-2"), "unexpected help text: {reply}");

        app.db_pool.close().await;
    }
}
