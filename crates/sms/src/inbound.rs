use scoreline_core::reporting::InboundMessage;
use serde::Deserialize;

/// Body Twilio expects back when the reply is sent out of band.
pub const EMPTY_TWIML: &str = "<?xml version=\"1.0\"?><Response></Response>";
pub const TWIML_CONTENT_TYPE: &str = "text/xml";

/// The subset of Twilio's webhook form the reporter needs.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TwilioInbound {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: Option<String>,
}

impl TwilioInbound {
    /// The message SID doubles as the correlation id when Twilio sends one.
    pub fn into_message(self) -> InboundMessage {
        let message = InboundMessage::new(self.from, self.body);
        match self.message_sid.filter(|sid| !sid.trim().is_empty()) {
            Some(sid) => message.with_correlation_id(sid),
            None => message,
        }
    }
}
