//! Escrow vesting schedule
//!
//! An escrowed stake grant locks its full amount at creation and unlocks
//! `initial / period_count` per elapsed vesting period (~6 months each),
//! with the first tranche available immediately. Undelegation draws against
//! the unlocked share of every bucket the account holds, oldest first.
//!
//! ## Unlock arithmetic
//!
//! For a bucket at time `now`:
//!
//! ```text
//! elapsed    = (now - created) / ESCROW_PERIOD_SECS
//! unstaked   = initial - remaining
//! unlockable = floor(initial / period_count) * min(elapsed + 1, period_count) - unstaked
//! ```
//!
//! The tranche count is capped at `period_count`, so the vested share never
//! exceeds `initial`. The draw walk clips against the running total rather
//! than the bucket: when the delegation row carries free stake beyond the
//! request, the clip credits the surplus back into the bucket, `amount` can
//! then sit above `initial_amount`, and the excess reads back as unlocked
//! on later draws.

use crate::constants::ESCROW_PERIOD_SECS;
use crate::error::{EconomyError, Result};
use pylon_core::{AccountName, Asset, TimePointSec};
use serde::{Deserialize, Serialize};

/// One time-locked stake bucket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Account whose stake is locked
    pub owner: AccountName,
    /// Amount locked at creation; never changes
    pub initial_amount: Asset,
    /// Amount still held against this bucket; [`draw_unlocked`] may credit
    /// it above `initial_amount` when free stake covers a request
    pub amount: Asset,
    /// Creation time of the bucket
    pub created: TimePointSec,
    /// Number of unlock periods in the schedule
    pub period_count: u8,
}

impl EscrowRecord {
    /// Whole vesting periods elapsed since creation
    pub fn elapsed_periods(&self, now: TimePointSec) -> u64 {
        now.elapsed_since(self.created) / ESCROW_PERIOD_SECS
    }

    /// Net amount drawn out of this bucket, negative after a surplus credit
    pub fn unstaked(&self) -> Result<Asset> {
        Ok(self.initial_amount.checked_sub(self.amount)?)
    }

    /// Share currently unlockable beyond what was already drawn
    pub fn unlockable(&self, now: TimePointSec) -> Result<Asset> {
        if self.period_count == 0 {
            return Err(EconomyError::ZeroPeriodCount);
        }
        let per_period = self.initial_amount.amount() / i64::from(self.period_count);
        // one tranche per elapsed period plus the immediate first tranche,
        // capped at the schedule length so a fully vested bucket can never
        // unlock more than it holds
        let tranches = self
            .elapsed_periods(now)
            .saturating_add(1)
            .min(u64::from(self.period_count)) as i64;
        let vested = self
            .initial_amount
            .with_amount(per_period)
            .checked_mul(tranches)?;
        Ok(vested.checked_sub(self.unstaked()?)?)
    }
}

/// Walk the owner's buckets, drawing unlocked stake toward `requested`
///
/// Starts from `starting` (the delegation row's combined weight), removes
/// each bucket's still-held remainder and adds back its unlockable share,
/// clipping the final bucket's draw once the request is satisfied. Every
/// visited bucket absorbs the clipped share, including any surplus the
/// running total already covered with free stake (the draw then goes
/// negative and the bucket is credited), which mirrors the long-standing
/// ledger bookkeeping for this table.
///
/// Returns the accumulated withdrawable amount; the caller fails the
/// undelegation if it falls short of the request.
pub(crate) fn draw_unlocked(
    buckets: &mut [EscrowRecord],
    owner: &AccountName,
    now: TimePointSec,
    starting: Asset,
    requested: Asset,
) -> Result<Asset> {
    let mut available = starting;
    let mut enough = false;

    for bucket in buckets.iter_mut() {
        if enough {
            break;
        }
        if bucket.owner != *owner {
            continue;
        }

        let mut from_bucket = bucket.unlockable(now)?;

        available = available.checked_sub(bucket.amount)?;
        available = available.checked_add(from_bucket)?;

        if available > requested {
            let surplus = available.checked_sub(requested)?;
            from_bucket = from_bucket.checked_sub(surplus)?;
            available = requested;
            enough = true;
        }

        bucket.amount = bucket.amount.checked_sub(from_bucket)?;
    }

    Ok(available)
}
