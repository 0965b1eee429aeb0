//! Fixed-point asset arithmetic
//!
//! An [`Asset`] is a signed 64-bit integer magnitude tagged with a [`Symbol`]
//! (currency code and fixed decimal precision). The magnitude is denominated
//! in the smallest unit of the currency, so a 4-decimal core token holds
//! `1.0000` as `10_000`.
//!
//! All arithmetic is checked: overflow and mixed-currency operations return
//! [`CoreError`] instead of wrapping or coercing. Comparison across different
//! currencies is deliberately unordered (`partial_cmp` returns `None`).

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum symbol code length in bytes
pub const MAX_SYMBOL_LEN: usize = 7;

/// Currency tag: uppercase code plus fixed decimal precision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Code bytes, NUL padded (e.g. `b"PYL\0\0\0\0"`)
    code: [u8; 7],
    /// Number of decimal places
    precision: u8,
}

impl Symbol {
    /// Construct a symbol at compile time
    ///
    /// Panics at compile time if the code is empty, longer than
    /// [`MAX_SYMBOL_LEN`], or not uppercase A-Z.
    pub const fn new(code: &str, precision: u8) -> Self {
        let bytes = code.as_bytes();
        assert!(!bytes.is_empty(), "symbol code must not be empty");
        assert!(bytes.len() <= MAX_SYMBOL_LEN, "symbol code too long");

        let mut buf = [0u8; 7];
        let mut i = 0;
        while i < bytes.len() {
            assert!(
                bytes[i] >= b'A' && bytes[i] <= b'Z',
                "symbol code must be uppercase A-Z"
            );
            buf[i] = bytes[i];
            i += 1;
        }
        Self {
            code: buf,
            precision,
        }
    }

    /// The currency code as a string
    pub fn code(&self) -> String {
        self.code
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect()
    }

    /// Number of decimal places
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Smallest-unit scale factor (`10^precision`)
    pub fn scale(&self) -> i64 {
        10i64.pow(u32::from(self.precision))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Checked fixed-point quantity of a single currency
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Magnitude in smallest units (may be negative)
    amount: i64,
    /// Currency tag
    symbol: Symbol,
}

impl Asset {
    /// Create an asset from a smallest-unit magnitude
    pub const fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    /// Zero of the given currency
    pub const fn zero(symbol: Symbol) -> Self {
        Self { amount: 0, symbol }
    }

    /// Magnitude in smallest units
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Currency tag
    pub const fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Same currency, different magnitude
    pub const fn with_amount(&self, amount: i64) -> Self {
        Self {
            amount,
            symbol: self.symbol,
        }
    }

    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Error unless `other` is denominated in the same currency
    pub fn ensure_same_symbol(&self, other: &Asset) -> Result<()> {
        if self.symbol == other.symbol {
            Ok(())
        } else {
            Err(CoreError::SymbolMismatch {
                expected: self.symbol.code(),
                found: other.symbol.code(),
            })
        }
    }

    /// Checked addition; fails on symbol mismatch or overflow
    pub fn checked_add(self, other: Asset) -> Result<Asset> {
        self.ensure_same_symbol(&other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(CoreError::AmountOverflow)?;
        Ok(self.with_amount(amount))
    }

    /// Checked subtraction; fails on symbol mismatch or overflow
    pub fn checked_sub(self, other: Asset) -> Result<Asset> {
        self.ensure_same_symbol(&other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(CoreError::AmountOverflow)?;
        Ok(self.with_amount(amount))
    }

    /// Checked negation; fails only for `i64::MIN`
    pub fn checked_neg(self) -> Result<Asset> {
        let amount = self
            .amount
            .checked_neg()
            .ok_or(CoreError::AmountOverflow)?;
        Ok(self.with_amount(amount))
    }

    /// Checked scalar multiplication
    pub fn checked_mul(self, factor: i64) -> Result<Asset> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or(CoreError::AmountOverflow)?;
        Ok(self.with_amount(amount))
    }
}

impl PartialOrd for Asset {
    /// Assets of different currencies are unordered
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.symbol == other.symbol {
            Some(self.amount.cmp(&other.amount))
        } else {
            None
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        let scale = self.symbol.scale() as u64;
        if self.symbol.precision() == 0 {
            write!(f, "{}{} {}", sign, magnitude, self.symbol)
        } else {
            write!(
                f,
                "{}{}.{:0width$} {}",
                sign,
                magnitude / scale,
                magnitude % scale,
                self.symbol,
                width = self.symbol.precision() as usize
            )
        }
    }
}
