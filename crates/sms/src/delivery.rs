use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scoreline_core::config::{SmsConfig, SmsDelivery};
use scoreline_core::domain::identity::PhoneNumber;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("sms delivery is not configured: missing {0}")]
    NotConfigured(&'static str),
    #[error("sms http client could not be built: {0}")]
    Client(#[source] reqwest::Error),
    #[error("sms request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("sms provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), DeliveryError>;

    fn name(&self) -> &'static str;
}

/// Drops every message. Used when `sms.delivery = "disabled"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledSender;

#[async_trait]
impl SmsSender for DisabledSender {
    async fn send(&self, to: &str, _body: &str) -> Result<(), DeliveryError> {
        info!(
            event_name = "egress.sms.delivery_skipped",
            to = %mask(to),
            "sms delivery disabled; reply not sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Sends through Twilio's Messages resource.
pub struct TwilioSender {
    client: Client,
    messages_url: String,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl std::fmt::Debug for TwilioSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSender")
            .field("messages_url", &self.messages_url)
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

impl TwilioSender {
    pub fn new(
        api_base_url: &str,
        account_sid: impl Into<String>,
        auth_token: SecretString,
        from_number: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let account_sid = account_sid.into();
        let client = Client::builder().timeout(timeout).build().map_err(DeliveryError::Client)?;
        let messages_url = format!(
            "{}/2010-04-01/Accounts/{account_sid}/Messages.json",
            api_base_url.trim_end_matches('/')
        );

        Ok(Self { client, messages_url, account_sid, auth_token, from_number: from_number.into() })
    }

    pub fn from_config(config: &SmsConfig) -> Result<Self, DeliveryError> {
        let account_sid =
            config.account_sid.clone().ok_or(DeliveryError::NotConfigured("sms.account_sid"))?;
        let auth_token =
            config.auth_token.clone().ok_or(DeliveryError::NotConfigured("sms.auth_token"))?;
        let from_number =
            config.from_number.clone().ok_or(DeliveryError::NotConfigured("sms.from_number"))?;

        Self::new(
            &config.api_base_url,
            account_sid,
            auth_token,
            from_number,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(DeliveryError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status: status.as_u16(), body });
        }

        info!(event_name = "egress.sms.delivered", to = %mask(to), "sms reply delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "twilio"
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

/// Keeps every message in memory. `simulate` and tests read them back.
#[derive(Clone, Debug, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let message = SentMessage { to: to.to_string(), body: body.to_string() };
        match self.sent.lock() {
            Ok(mut sent) => sent.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn sender_from_config(config: &SmsConfig) -> Result<Arc<dyn SmsSender>, DeliveryError> {
    match config.delivery {
        SmsDelivery::Disabled => Ok(Arc::new(DisabledSender)),
        SmsDelivery::Twilio => Ok(Arc::new(TwilioSender::from_config(config)?)),
    }
}

/// Sends a reply and swallows the failure after logging it. Returns whether
/// the provider accepted the message.
pub async fn deliver_best_effort(
    sender: &dyn SmsSender,
    to: &str,
    body: &str,
    correlation_id: &str,
) -> bool {
    match sender.send(to, body).await {
        Ok(()) => true,
        Err(error) => {
            warn!(
                event_name = "egress.sms.delivery_failed",
                correlation_id,
                sender = sender.name(),
                to = %mask(to),
                error = %error,
                "sms reply could not be delivered"
            );
            false
        }
    }
}

fn mask(raw: &str) -> String {
    PhoneNumber::normalize(raw).map(|phone| phone.masked()).unwrap_or_else(|| "***".to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scoreline_core::config::{AppConfig, SmsDelivery};
    use secrecy::SecretString;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        deliver_best_effort, sender_from_config, DeliveryError, RecordingSender, SmsSender,
        TwilioSender,
    };

    const SID: &str = "AC0123456789abcdef";

    fn twilio(server: &MockServer) -> TwilioSender {
        TwilioSender::new(
            &server.uri(),
            SID,
            SecretString::from("token-123".to_string()),
            "+15550009999",
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[tokio::test]
    async fn twilio_sender_posts_form_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/2010-04-01/Accounts/{SID}/Messages.json")))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B15550100001"))
            .and(body_string_contains("From=%2B15550009999"))
            .and(body_string_contains("Body=Confirmed"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        twilio(&server).send("+15550100001", "Confirmed").await.expect("delivered");
    }

    #[tokio::test]
    async fn provider_rejection_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid To"))
            .mount(&server)
            .await;

        let error = twilio(&server).send("+15550100001", "hi").await.expect_err("rejected");
        match error {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid To");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn best_effort_delivery_reports_failure_without_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let delivered = deliver_best_effort(&twilio(&server), "+15550100001", "hi", "SM1").await;
        assert!(!delivered);
    }

    #[tokio::test]
    async fn recording_sender_keeps_messages_in_order() {
        let sender = RecordingSender::new();
        assert!(deliver_best_effort(&sender, "+15550100001", "first", "c-1").await);
        assert!(deliver_best_effort(&sender, "+15550100002", "second", "c-2").await);

        let bodies: Vec<String> = sender.sent().into_iter().map(|sent| sent.body).collect();
        assert_eq!(bodies, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn config_selects_sender_and_rejects_incomplete_twilio_settings() {
        let mut config = AppConfig::default().sms;
        let disabled = sender_from_config(&config).expect("disabled sender");
        assert_eq!(disabled.name(), "disabled");

        config.delivery = SmsDelivery::Twilio;
        config.account_sid = Some(SID.to_string());
        let error = sender_from_config(&config).err().expect("missing token");
        assert!(error.to_string().contains("sms.auth_token"));

        config.auth_token = Some(SecretString::from("token".to_string()));
        config.from_number = Some("+15550009999".to_string());
        let twilio = sender_from_config(&config).expect("twilio sender");
        assert_eq!(twilio.name(), "twilio");
    }

    #[test]
    fn messages_url_ignores_trailing_slash() {
        let sender = TwilioSender::new(
            "https://api.twilio.com/",
            SID,
            SecretString::from("token".to_string()),
            "+15550009999",
            Duration::from_secs(5),
        )
        .expect("client builds");
        assert_eq!(
            sender.messages_url(),
            format!("https://api.twilio.com/2010-04-01/Accounts/{SID}/Messages.json")
        );
    }
}
