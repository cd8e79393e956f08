//! Account identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Identifies a ledger account.
///
/// The ledger treats identifiers as opaque keys; only the textual form
/// accepted by [`FromStr`] is validated.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Longest identifier accepted when parsing.
    pub const MAX_LEN: usize = 64;

    /// Create an account id from a raw string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this identifier is well-formed.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= Self::MAX_LEN
            && !self.0.chars().any(char::is_whitespace)
    }
}

impl FromStr for AccountId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(TypeError::InvalidAccountId(s.to_string()))
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_identifier() {
        let id: AccountId = "alice".parse().unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert!("".parse::<AccountId>().is_err());
        assert!("al ice".parse::<AccountId>().is_err());
    }

    #[test]
    fn parse_rejects_overlong_identifier() {
        let long = "a".repeat(AccountId::MAX_LEN + 1);
        assert_eq!(
            long.parse::<AccountId>(),
            Err(TypeError::InvalidAccountId(long.clone()))
        );
    }
}
