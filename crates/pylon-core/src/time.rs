//! Second-resolution chain timestamps
//!
//! The economy samples the platform clock once per operation and works in
//! whole seconds since the UNIX epoch. Arithmetic is saturating: a malformed
//! timestamp can never wrap into the far future.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the UNIX epoch
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimePointSec(u64);

impl TimePointSec {
    /// Create from a seconds count
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the epoch
    pub const fn secs(&self) -> u64 {
        self.0
    }

    /// This instant plus `secs`, saturating
    pub fn saturating_add_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Whole seconds elapsed since `earlier`, zero if `earlier` is later
    pub fn elapsed_since(&self, earlier: TimePointSec) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::from_timestamp(self.0 as i64, 0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            None => write!(f, "{}s", self.0),
        }
    }
}
