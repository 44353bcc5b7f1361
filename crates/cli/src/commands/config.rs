use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use scoreline_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value) in effective_values(&config) {
        let source = field_source(
            key_path,
            &env_key(key_path),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

fn effective_values(config: &AppConfig) -> Vec<(&'static str, String)> {
    let optional = |value: Option<&String>| value.cloned().unwrap_or_else(|| "<unset>".to_string());

    vec![
        ("database.url", config.database.url.clone()),
        ("database.max_connections", config.database.max_connections.to_string()),
        ("database.timeout_secs", config.database.timeout_secs.to_string()),
        ("sms.delivery", config.sms.delivery.as_str().to_string()),
        ("sms.account_sid", redact_sid(config.sms.account_sid.as_deref())),
        (
            "sms.auth_token",
            if config.sms.auth_token.is_some() { "<redacted>" } else { "<unset>" }.to_string(),
        ),
        ("sms.from_number", optional(config.sms.from_number.as_ref())),
        ("sms.api_base_url", config.sms.api_base_url.clone()),
        ("sms.timeout_secs", config.sms.timeout_secs.to_string()),
        ("reporting.fixture_window", config.reporting.fixture_window.to_string()),
        ("reporting.sweep_interval_secs", config.reporting.sweep_interval_secs.to_string()),
        ("server.bind_address", config.server.bind_address.clone()),
        ("server.port", config.server.port.to_string()),
        ("server.graceful_shutdown_secs", config.server.graceful_shutdown_secs.to_string()),
        ("logging.level", config.logging.level.clone()),
        ("logging.format", format!("{:?}", config.logging.format)),
    ]
}

/// `sms.account_sid` -> `SCORELINE_SMS_ACCOUNT_SID`
fn env_key(key_path: &str) -> String {
    format!("SCORELINE_{}", key_path.replace('.', "_").to_ascii_uppercase())
}

fn detect_config_path() -> Option<PathBuf> {
    ["scoreline.toml", "config/scoreline.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_sid(sid: Option<&str>) -> String {
    let Some(sid) = sid.map(str::trim).filter(|sid| !sid.is_empty()) else {
        return "<unset>".to_string();
    };

    let chars: Vec<char> = sid.chars().collect();
    if chars.len() <= 6 {
        return "<redacted>".to_string();
    }
    let prefix: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}***{tail}")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, env_key, redact_sid};

    #[test]
    fn env_keys_follow_the_section_field_convention() {
        assert_eq!(env_key("reporting.fixture_window"), "SCORELINE_REPORTING_FIXTURE_WINDOW");
        assert_eq!(env_key("sms.auth_token"), "SCORELINE_SMS_AUTH_TOKEN");
    }

    #[test]
    fn account_sid_keeps_prefix_and_last_four() {
        assert_eq!(redact_sid(Some("AC0123456789abcdef")), "AC***cdef");
        assert_eq!(redact_sid(Some("AC12")), "<redacted>");
        assert_eq!(redact_sid(None), "<unset>");
    }

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc = "[reporting]\nfixture_window = 8\n".parse::<Value>().expect("toml");
        assert!(contains_path(&doc, "reporting.fixture_window"));
        assert!(!contains_path(&doc, "reporting.sweep_interval_secs"));
    }
}
