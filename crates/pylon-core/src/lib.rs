//! # Pylon Core - Foundational Value Types
//!
//! Shared value types for the Pylon resource economy.
//!
//! Every quantity that moves through the staking ledger or the RAM market is an
//! [`Asset`]: a signed 64-bit fixed-point magnitude tagged with a [`Symbol`]
//! (currency code plus decimal precision). Arithmetic on assets is always
//! checked: overflow and cross-currency operations are errors, never silent
//! wraparound or coercion. No floating point is used anywhere in the economy.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`AccountName`] | Ledger scope / row key for every table |
//! | [`Symbol`] | Currency code + fixed decimal precision |
//! | [`Asset`] | Checked fixed-point quantity of one currency |
//! | [`TimePointSec`] | Second-resolution chain timestamp |
//! | [`CoreError`] | Arithmetic and typing failures |

pub mod account;
pub mod asset;
pub mod error;
pub mod time;

// Re-exports
pub use account::AccountName;
pub use asset::{Asset, Symbol};
pub use error::{CoreError, Result};
pub use time::TimePointSec;
