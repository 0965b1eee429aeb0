//! Account identifiers
//!
//! Every row in the economy's tables is scoped and keyed by an account name.
//! Names are short lowercase identifiers assigned at account creation; this
//! crate treats them as opaque ordered keys and leaves name registration to
//! the platform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger account identifier
///
/// Ordered and hashable so it can serve as a scope or primary key in the
/// economy's ordered tables.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    /// Create an account name from any string-like value
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
