use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrgId(pub String);

const PHONE_DIGITS: usize = 10;

/// Canonical phone key: the trailing ten digits of whatever the carrier sent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strips every non-digit and keeps the last ten digits. Returns `None`
    /// when the input carries no digits at all.
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }

        let start = digits.len().saturating_sub(PHONE_DIGITS);
        Some(Self(digits[start..].iter().collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe rendering that only exposes the last four digits.
    pub fn masked(&self) -> String {
        let visible = self.0.len().saturating_sub(4);
        format!("***{}", &self.0[visible..])
    }
}

/// A registered reporter, as resolved from the sender's phone number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub phone: PhoneNumber,
    pub team_id: TeamId,
    pub org_id: OrgId,
}
