use serde::{Deserialize, Serialize};

use crate::domain::fixture::Side;
use crate::errors::DomainError;

/// Highest plausible per-team score; anything above is treated as a typo.
pub const MAX_SCORE: u8 = 5;

/// A score as the reporting team sees it: its own score first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub own: u8,
    pub opponent: u8,
}

impl ScorePair {
    pub fn new(own: u32, opponent: u32) -> Result<Self, DomainError> {
        Ok(Self { own: checked_score(own)?, opponent: checked_score(opponent)? })
    }

    pub fn swapped(self) -> Self {
        Self { own: self.opponent, opponent: self.own }
    }

    /// Maps the team-relative pair onto the fixture's home/away frame.
    pub fn to_scoreline(self, side: Side) -> Scoreline {
        match side {
            Side::Home => Scoreline { home: self.own, away: self.opponent },
            Side::Away => Scoreline { home: self.opponent, away: self.own },
        }
    }
}

/// A score in the fixture's frame. Two reports are only ever compared here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u8,
    pub away: u8,
}

impl Scoreline {
    pub fn new(home: u32, away: u32) -> Result<Self, DomainError> {
        Ok(Self { home: checked_score(home)?, away: checked_score(away)? })
    }
}

fn checked_score(value: u32) -> Result<u8, DomainError> {
    u8::try_from(value)
        .ok()
        .filter(|score| *score <= MAX_SCORE)
        .ok_or(DomainError::ScoreOutOfRange { value, max: MAX_SCORE })
}
