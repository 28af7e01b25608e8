use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Ticker code of a tradable instrument (e.g. "AAPL")
///
/// Used as the key of the market and of every holdings map, so it is
/// cheap to clone and orders lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentCode(pub String);

impl InstrumentCode {
    /// Create a new instrument code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstrumentCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstrumentCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstrumentCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for InstrumentCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier of an agent account (e.g. "Player", "RandomTrader_3")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for AccountId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
