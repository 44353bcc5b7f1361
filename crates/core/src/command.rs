//! Free-text command parsing for inbound score reports.
//!
//! The grammar is deliberately narrow: two small integers optionally joined by
//! a dash, whitespace, or the word "to". Anything else is a parse failure.
//! Which of the two numbers belongs to the reporting team is decided by a
//! [`DirectionClassifier`], kept behind a trait so a smarter classifier can
//! replace the keyword rule without touching fixture location or
//! reconciliation.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use thiserror::Error;

use crate::domain::score::{ScorePair, MAX_SCORE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundCommand {
    Score(ScorePair),
    Help,
    Status,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("message is empty")]
    Empty,
    #[error("no score pair found in message")]
    NoScorePair,
    #[error("score `{raw}` exceeds the maximum of {max}")]
    ScoreOutOfRange { raw: String, max: u8 },
}

/// Decides whether a message reports a loss, in which case the typed pair is
/// read as (opponent, own) instead of (own, opponent).
pub trait DirectionClassifier: Send + Sync {
    fn is_loss(&self, normalized_text: &str) -> bool;
}

/// Treats the words "lost" and "lose" as loss indicators.
///
/// Only whole words count. A bare substring match would also flip the pair
/// for "closed" or "loser"; this classifier deliberately does not.
#[derive(Clone, Debug, Default)]
pub struct LossKeywordClassifier;

impl DirectionClassifier for LossKeywordClassifier {
    fn is_loss(&self, normalized_text: &str) -> bool {
        loss_pattern().is_match(normalized_text)
    }
}

#[derive(Clone)]
pub struct CommandParser {
    classifier: Arc<dyn DirectionClassifier>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(Arc::new(LossKeywordClassifier))
    }
}

impl std::fmt::Debug for CommandParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandParser").finish_non_exhaustive()
    }
}

impl CommandParser {
    pub fn new(classifier: Arc<dyn DirectionClassifier>) -> Self {
        Self { classifier }
    }

    pub fn parse(&self, text: &str) -> Result<InboundCommand, ParseFailure> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ParseFailure::Empty);
        }

        match normalized.as_str() {
            "help" => return Ok(InboundCommand::Help),
            "status" => return Ok(InboundCommand::Status),
            _ => {}
        }

        let captures = score_pattern().captures(&normalized).ok_or(ParseFailure::NoScorePair)?;
        let first = bounded_score(&captures[1])?;
        let second = bounded_score(&captures[2])?;

        let pair = ScorePair::new(first, second).map_err(|_| ParseFailure::ScoreOutOfRange {
            raw: format!("{first}-{second}"),
            max: MAX_SCORE,
        })?;

        if self.classifier.is_loss(&normalized) {
            Ok(InboundCommand::Score(pair.swapped()))
        } else {
            Ok(InboundCommand::Score(pair))
        }
    }
}

pub fn parse_command(text: &str) -> Result<InboundCommand, ParseFailure> {
    CommandParser::default().parse(text)
}

fn bounded_score(raw: &str) -> Result<u32, ParseFailure> {
    raw.parse::<u32>()
        .ok()
        .filter(|value| *value <= u32::from(MAX_SCORE))
        .ok_or_else(|| ParseFailure::ScoreOutOfRange { raw: raw.to_string(), max: MAX_SCORE })
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+)\s*[-\s]?\s*(?:to\s*)?([0-9]+)").expect("valid score pair regex")
    })
}

fn loss_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(?:lost|lose)\b").expect("valid loss keyword regex"))
}
