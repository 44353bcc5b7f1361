//! SMS transport for scoreline
//!
//! This crate owns everything that touches the carrier:
//! - **Inbound** (`inbound`) - Twilio webhook form model and the empty TwiML acknowledgement
//! - **Delivery** (`delivery`) - outbound `SmsSender` trait with Twilio REST, disabled and recording senders
//!
//! # Architecture
//!
//! ```text
//! Twilio webhook → TwilioInbound → InboundMessage → ScoreReporter
//!                                                       ↓
//!                     SmsSender ← reply text ← ReportOutcome
//! ```
//!
//! Replies go out after the reporter has committed its decision. A failed
//! delivery is logged and never touches ledger state.

pub mod delivery;
pub mod inbound;

pub use delivery::{
    deliver_best_effort, sender_from_config, DeliveryError, DisabledSender, RecordingSender,
    SentMessage, SmsSender, TwilioSender,
};
pub use inbound::{TwilioInbound, EMPTY_TWIML, TWIML_CONTENT_TYPE};
