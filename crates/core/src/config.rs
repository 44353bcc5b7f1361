use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locator::DEFAULT_FIXTURE_WINDOW;

pub const MAX_FIXTURE_WINDOW: u32 = 50;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sms: SmsConfig,
    pub reporting: ReportingConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SmsConfig {
    pub delivery: SmsDelivery,
    pub account_sid: Option<String>,
    pub auth_token: Option<SecretString>,
    pub from_number: Option<String>,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ReportingConfig {
    /// How many of a team's most recent fixtures are searched for an
    /// unscored one.
    pub fixture_window: u32,
    /// Period of the background reconciliation sweep; zero disables it.
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsDelivery {
    Disabled,
    Twilio,
}

impl SmsDelivery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Twilio => "twilio",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub sms_delivery: Option<SmsDelivery>,
    pub fixture_window: Option<u32>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://scoreline.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            sms: SmsConfig {
                delivery: SmsDelivery::Disabled,
                account_sid: None,
                auth_token: None,
                from_number: None,
                api_base_url: "https://api.twilio.com".to_string(),
                timeout_secs: 10,
            },
            reporting: ReportingConfig {
                fixture_window: DEFAULT_FIXTURE_WINDOW,
                sweep_interval_secs: 60,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for SmsDelivery {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "twilio" => Ok(Self::Twilio),
            other => Err(ConfigError::Validation(format!(
                "unsupported sms delivery `{other}` (expected disabled|twilio)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("scoreline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The listen address for the HTTP server.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(sms) = patch.sms {
            if let Some(delivery) = sms.delivery {
                self.sms.delivery = delivery;
            }
            if let Some(account_sid) = sms.account_sid {
                self.sms.account_sid = Some(account_sid);
            }
            if let Some(auth_token) = sms.auth_token {
                self.sms.auth_token = Some(secret_value(auth_token));
            }
            if let Some(from_number) = sms.from_number {
                self.sms.from_number = Some(from_number);
            }
            if let Some(api_base_url) = sms.api_base_url {
                self.sms.api_base_url = api_base_url;
            }
            if let Some(timeout_secs) = sms.timeout_secs {
                self.sms.timeout_secs = timeout_secs;
            }
        }

        if let Some(reporting) = patch.reporting {
            if let Some(fixture_window) = reporting.fixture_window {
                self.reporting.fixture_window = fixture_window;
            }
            if let Some(sweep_interval_secs) = reporting.sweep_interval_secs {
                self.reporting.sweep_interval_secs = sweep_interval_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SCORELINE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SCORELINE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("SCORELINE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SCORELINE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("SCORELINE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SCORELINE_SMS_DELIVERY") {
            self.sms.delivery = value.parse()?;
        }
        if let Some(value) = read_env("SCORELINE_SMS_ACCOUNT_SID") {
            self.sms.account_sid = Some(value);
        }
        if let Some(value) = read_env("SCORELINE_SMS_AUTH_TOKEN") {
            self.sms.auth_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("SCORELINE_SMS_FROM_NUMBER") {
            self.sms.from_number = Some(value);
        }
        if let Some(value) = read_env("SCORELINE_SMS_API_BASE_URL") {
            self.sms.api_base_url = value;
        }
        if let Some(value) = read_env("SCORELINE_SMS_TIMEOUT_SECS") {
            self.sms.timeout_secs = parse_u64("SCORELINE_SMS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SCORELINE_REPORTING_FIXTURE_WINDOW") {
            self.reporting.fixture_window =
                parse_u32("SCORELINE_REPORTING_FIXTURE_WINDOW", &value)?;
        }
        if let Some(value) = read_env("SCORELINE_REPORTING_SWEEP_INTERVAL_SECS") {
            self.reporting.sweep_interval_secs =
                parse_u64("SCORELINE_REPORTING_SWEEP_INTERVAL_SECS", &value)?;
        }

        if let Some(value) = read_env("SCORELINE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SCORELINE_SERVER_PORT") {
            self.server.port = parse_u16("SCORELINE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SCORELINE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SCORELINE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("SCORELINE_LOGGING_LEVEL").or_else(|| read_env("SCORELINE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SCORELINE_LOGGING_FORMAT").or_else(|| read_env("SCORELINE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(delivery) = overrides.sms_delivery {
            self.sms.delivery = delivery;
        }
        if let Some(fixture_window) = overrides.fixture_window {
            self.reporting.fixture_window = fixture_window;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_sms(&self.sms)?;
        validate_reporting(&self.reporting)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("scoreline.toml"), PathBuf::from("config/scoreline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_sms(sms: &SmsConfig) -> Result<(), ConfigError> {
    if sms.timeout_secs == 0 || sms.timeout_secs > 120 {
        return Err(ConfigError::Validation("sms.timeout_secs must be in range 1..=120".to_string()));
    }

    if !sms.api_base_url.starts_with("http://") && !sms.api_base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "sms.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if sms.delivery == SmsDelivery::Disabled {
        return Ok(());
    }

    let account_sid = sms.account_sid.as_deref().map(str::trim).unwrap_or_default();
    if account_sid.is_empty() {
        return Err(ConfigError::Validation(
            "sms.account_sid is required when sms.delivery = \"twilio\". Find it on the Twilio console dashboard".to_string(),
        ));
    }
    if !account_sid.starts_with("AC") {
        return Err(ConfigError::Validation(
            "sms.account_sid must start with `AC` (hint: API key SIDs start with `SK` and are not accepted here)".to_string(),
        ));
    }

    let missing_token =
        sms.auth_token.as_ref().map(|token| token.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing_token {
        return Err(ConfigError::Validation(
            "sms.auth_token is required when sms.delivery = \"twilio\"".to_string(),
        ));
    }

    let missing_from =
        sms.from_number.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
    if missing_from {
        return Err(ConfigError::Validation(
            "sms.from_number is required when sms.delivery = \"twilio\"".to_string(),
        ));
    }

    Ok(())
}

fn validate_reporting(reporting: &ReportingConfig) -> Result<(), ConfigError> {
    if reporting.fixture_window == 0 || reporting.fixture_window > MAX_FIXTURE_WINDOW {
        return Err(ConfigError::Validation(format!(
            "reporting.fixture_window must be in range 1..={MAX_FIXTURE_WINDOW}"
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    sms: Option<SmsPatch>,
    reporting: Option<ReportingPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SmsPatch {
    delivery: Option<SmsDelivery>,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportingPatch {
    fixture_window: Option<u32>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, SmsDelivery};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_without_any_file_or_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.sms.delivery == SmsDelivery::Disabled, "delivery should default off")?;
        ensure(config.reporting.fixture_window == 5, "fixture window should default to 5")?;
        ensure(config.listen_address() == "127.0.0.1:8080", "listen address default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_TWILIO_AUTH_TOKEN", "token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("scoreline.toml");
            fs::write(
                &path,
                r#"
[sms]
delivery = "twilio"
account_sid = "AC0123456789"
auth_token = "${TEST_TWILIO_AUTH_TOKEN}"
from_number = "+15550001111"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.sms.auth_token.as_ref().map(|token| token.expose_secret())
                    == Some("token-from-env"),
                "auth token should be loaded from environment",
            )?;
            ensure(config.sms.delivery == SmsDelivery::Twilio, "delivery should come from file")
        })();

        clear_vars(&["TEST_TWILIO_AUTH_TOKEN"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SCORELINE_LOG_LEVEL", "warn");
        env::set_var("SCORELINE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["SCORELINE_LOG_LEVEL", "SCORELINE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SCORELINE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("SCORELINE_REPORTING_FIXTURE_WINDOW", "8");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("scoreline.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[reporting]
fixture_window = 3
sweep_interval_secs = 0

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.reporting.fixture_window == 8, "env window should win over file")?;
            ensure(config.reporting.sweep_interval_secs == 0, "file should disable the sweep")?;
            Ok(())
        })();

        clear_vars(&["SCORELINE_DATABASE_URL", "SCORELINE_REPORTING_FIXTURE_WINDOW"]);
        result
    }

    #[test]
    fn twilio_delivery_requires_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SCORELINE_SMS_DELIVERY", "twilio");
        env::set_var("SCORELINE_SMS_ACCOUNT_SID", "SK-not-an-account");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("sms.account_sid")
            );
            ensure(has_message, "validation failure should mention sms.account_sid")
        })();

        clear_vars(&["SCORELINE_SMS_DELIVERY", "SCORELINE_SMS_ACCOUNT_SID"]);
        result
    }

    #[test]
    fn fixture_window_is_bounded() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { fixture_window: Some(0), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("fixture_window")),
            "zero fixture window should be rejected",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SCORELINE_SMS_DELIVERY", "twilio");
        env::set_var("SCORELINE_SMS_ACCOUNT_SID", "AC0000000000");
        env::set_var("SCORELINE_SMS_AUTH_TOKEN", "twilio-secret-value");
        env::set_var("SCORELINE_SMS_FROM_NUMBER", "+15550001111");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("twilio-secret-value"),
                "debug output should not contain the auth token",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&[
            "SCORELINE_SMS_DELIVERY",
            "SCORELINE_SMS_ACCOUNT_SID",
            "SCORELINE_SMS_AUTH_TOKEN",
            "SCORELINE_SMS_FROM_NUMBER",
        ]);
        result
    }
}
