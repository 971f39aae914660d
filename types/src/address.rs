//! Account identifiers for voters, delegates and transfer recipients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account known to the voting-power oracle.
///
/// The engine treats accounts as opaque identifiers; it never derives or
/// checks them cryptographically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An account is well-formed when it is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Account {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
