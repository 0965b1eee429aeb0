//! Error types for core value-type operations

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by asset and symbol arithmetic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Two assets of different currencies were combined
    #[error("symbol mismatch: expected {expected}, found {found}")]
    SymbolMismatch { expected: String, found: String },

    /// A checked add/sub/mul/neg overflowed the i64 magnitude
    #[error("asset amount overflow")]
    AmountOverflow,

    /// Symbol code is empty, too long, or not uppercase A-Z
    #[error("invalid symbol code: {0}")]
    InvalidSymbolCode(String),
}
