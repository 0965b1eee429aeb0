//! Continuous-reserve RAM market
//!
//! A bancor-style connector pair holding a core-currency reserve against a
//! synthetic RAM-byte reserve. The pair is kept at a fixed 100:1 reserve
//! ratio, for which the conversion curve collapses to the closed form
//!
//! ```text
//! out = out_reserve * in / (in_reserve + in)
//! ```
//!
//! evaluated in 128-bit integer arithmetic, truncating toward zero. The
//! truncation always favors the reserves: converting an amount out and
//! immediately converting it back never returns more than was put in, so the
//! market cannot be drained by round-tripping. Reserves stay strictly
//! positive and the core reserve changes only through [`RamMarket::convert`].

use crate::constants::{CORE_SYMBOL, RAM_SYMBOL};
use crate::error::{EconomyError, Result};
use pylon_core::Asset;
use serde::{Deserialize, Serialize};

/// Reserve pair backing the RAM market
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RamMarket {
    /// Core-currency reserve; grows on buys, shrinks on sells
    core_reserve: Asset,
    /// Unsold byte supply
    ram_reserve: Asset,
}

impl RamMarket {
    /// Open a market over an initial byte supply and its core-currency backing
    ///
    /// Both reserves must be strictly positive and denominated in the
    /// market's two currencies.
    pub fn new(core_reserve: Asset, ram_reserve: Asset) -> Result<Self> {
        if core_reserve.symbol() != CORE_SYMBOL {
            return Err(EconomyError::UnsupportedConversion(core_reserve));
        }
        if ram_reserve.symbol() != RAM_SYMBOL {
            return Err(EconomyError::UnsupportedConversion(ram_reserve));
        }
        if !core_reserve.is_positive() || !ram_reserve.is_positive() {
            return Err(EconomyError::ReserveDepleted);
        }
        Ok(Self {
            core_reserve,
            ram_reserve,
        })
    }

    /// Current core-currency reserve
    pub fn core_reserve(&self) -> Asset {
        self.core_reserve
    }

    /// Current unsold byte supply
    pub fn ram_reserve(&self) -> Asset {
        self.ram_reserve
    }

    /// Convert `input` into the opposite reserve currency
    ///
    /// Core in, bytes out (buy) or bytes in, core out (sell). Reserves are
    /// updated by `+input`, `-output`. A zero input converts to zero and
    /// leaves the reserves untouched.
    pub fn convert(&mut self, input: Asset) -> Result<Asset> {
        if input.is_negative() {
            return Err(EconomyError::UnsupportedConversion(input));
        }
        let (in_reserve, out_reserve) = if input.symbol() == CORE_SYMBOL {
            (&mut self.core_reserve, &mut self.ram_reserve)
        } else if input.symbol() == RAM_SYMBOL {
            (&mut self.ram_reserve, &mut self.core_reserve)
        } else {
            return Err(EconomyError::UnsupportedConversion(input));
        };

        let out = bancor_output(in_reserve.amount(), out_reserve.amount(), input.amount())?;

        let new_in = in_reserve.checked_add(input)?;
        let new_out = out_reserve.with_amount(
            out_reserve
                .amount()
                .checked_sub(out)
                .ok_or(EconomyError::ReserveDepleted)?,
        );
        if !new_in.is_positive() || !new_out.is_positive() {
            return Err(EconomyError::ReserveDepleted);
        }
        *in_reserve = new_in;
        *out_reserve = new_out;
        Ok(Asset::new(out, new_out.symbol()))
    }

    /// Price `input` without committing the reserve update
    pub fn peek_convert(&self, input: Asset) -> Result<Asset> {
        self.clone().convert(input)
    }
}

/// Integer bancor output for a balanced connector pair
///
/// `amount * out_reserve / (in_reserve + amount)` over i128, truncated.
fn bancor_output(in_reserve: i64, out_reserve: i64, amount: i64) -> Result<i64> {
    if in_reserve <= 0 || out_reserve <= 0 {
        return Err(EconomyError::ReserveDepleted);
    }
    let numerator = i128::from(amount) * i128::from(out_reserve);
    let denominator = i128::from(in_reserve) + i128::from(amount);
    let out = numerator / denominator;
    // out < out_reserve holds for any non-negative amount, so the cast is safe
    Ok(out as i64)
}
