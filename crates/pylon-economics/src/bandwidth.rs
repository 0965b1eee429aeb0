//! Bandwidth staking: the `changebw` stake transaction and its action surface
//!
//! `changebw` is the single transactional mutator behind `delegatebw`,
//! `undelegatebw` and `escrowbw`: it applies one signed (net, cpu) stake
//! delta across the delegation row, the receiver's resource totals, the
//! refund queue and the voter stake counter, as one unit.
//!
//! ## Swap mode
//!
//! When both deltas are negative the call runs in *swap* mode, the undo
//! direction of a delegation: the stored row `[delegator][delegatee]` is
//! addressed as `(receiver, from)`, the delegator (`receiver`) authorizes,
//! and the refund and voter bookkeeping attach to the delegator, the
//! account whose tokens originally funded the stake.
//!
//! ## Refund queue
//!
//! Undelegated stake never pays out directly: the negative portion of a
//! delta lands in the owner's single [`RefundRequest`] row, the request time
//! resets, and a deferred payout task is (re)scheduled after cancelling any
//! prior one. Restaking while a refund is pending draws the refund down
//! first and only transfers the remainder from the stake source.

use crate::constants::{
    self, CORE_SYMBOL, GENESIS_EPOCH_SECS, GENESIS_VESTING_YEARS, MAX_GENESIS_CLAIMABLE,
    MIN_ACTIVATED_STAKE, REFUND_DELAY_SECS, SECONDS_PER_YEAR,
};
use crate::error::{EconomyError, Result};
use crate::escrow::{self, EscrowRecord};
use crate::host::{EffectLog, Host};
use crate::ledger::{AccountResourceTotals, DelegatedStake, Ledger, RefundRequest, VoterStakeRecord};
use log::debug;
use pylon_core::{AccountName, Asset, CoreError, TimePointSec};

/// Stake tokens as net/CPU bandwidth for `receiver`
///
/// With `transfer` set the receiver becomes the owner of record (and the
/// flag is rejected for self-delegation, where it would be meaningless).
pub(crate) fn delegatebw<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    from: &AccountName,
    receiver: &AccountName,
    stake_net_quantity: Asset,
    stake_cpu_quantity: Asset,
    transfer: bool,
) -> Result<()> {
    ensure_core(stake_net_quantity)?;
    ensure_core(stake_cpu_quantity)?;
    if stake_net_quantity.is_negative() || stake_cpu_quantity.is_negative() {
        return Err(EconomyError::NonPositiveStake);
    }
    if !stake_net_quantity
        .checked_add(stake_cpu_quantity)?
        .is_positive()
    {
        return Err(EconomyError::NonPositiveStake);
    }
    if transfer && from == receiver {
        return Err(EconomyError::TransferToSelf);
    }

    changebw(
        ledger,
        fx,
        host,
        from,
        receiver,
        stake_net_quantity,
        stake_cpu_quantity,
        transfer,
    )
}

/// Unstake bandwidth previously delegated by `receiver` to `from`
///
/// The undo direction of [`delegatebw`]: the delegator passes itself as
/// `receiver` and the stake holder as `from`, and must authorize the call.
/// The request is gated by the escrow vesting schedule and by the
/// chain-wide activation threshold; the unstaked amount then flows into the
/// refund queue rather than paying out directly.
pub(crate) fn undelegatebw<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    from: &AccountName,
    receiver: &AccountName,
    unstake_net_quantity: Asset,
    unstake_cpu_quantity: Asset,
) -> Result<()> {
    ensure_core(unstake_net_quantity)?;
    ensure_core(unstake_cpu_quantity)?;
    if unstake_net_quantity.is_negative() || unstake_cpu_quantity.is_negative() {
        return Err(EconomyError::NonPositiveUnstake);
    }
    let requested = unstake_net_quantity.checked_add(unstake_cpu_quantity)?;
    if !requested.is_positive() {
        return Err(EconomyError::NonPositiveUnstake);
    }

    let row = ledger
        .delegation(receiver, from)
        .ok_or_else(|| EconomyError::UnknownDelegation {
            from: receiver.clone(),
            to: from.clone(),
        })?;
    let starting = row.net_weight.checked_add(row.cpu_weight)?;

    let now = host.now();
    let available = match ledger.escrows.get_mut(receiver) {
        Some(buckets) => escrow::draw_unlocked(buckets, from, now, starting, requested)?,
        None => starting,
    };
    debug!("available to unstake for {from}: {available}");

    if requested > available {
        return Err(EconomyError::InsufficientUnlockedStake { available });
    }
    if ledger.global.total_activated_stake < MIN_ACTIVATED_STAKE {
        return Err(EconomyError::ChainNotActivated);
    }

    changebw(
        ledger,
        fx,
        host,
        from,
        receiver,
        unstake_net_quantity.checked_neg()?,
        unstake_cpu_quantity.checked_neg()?,
        false,
    )
}

/// Stake with a linear vesting schedule
///
/// Performs an ordinary delegation, then records one escrow bucket on the
/// stake owner's scope: the full amount locked, unlocking in
/// `period_count` equal tranches, the first available immediately.
pub(crate) fn escrowbw<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    from: &AccountName,
    receiver: &AccountName,
    stake_net_quantity: Asset,
    stake_cpu_quantity: Asset,
    transfer: bool,
    period_count: u8,
) -> Result<()> {
    if period_count == 0 {
        return Err(EconomyError::ZeroPeriodCount);
    }
    delegatebw(
        ledger,
        fx,
        host,
        from,
        receiver,
        stake_net_quantity,
        stake_cpu_quantity,
        transfer,
    )?;

    let scope = if transfer { receiver } else { from };
    let total = stake_net_quantity.checked_add(stake_cpu_quantity)?;
    ledger
        .escrows
        .entry(scope.clone())
        .or_default()
        .push(EscrowRecord {
            owner: receiver.clone(),
            initial_amount: total,
            amount: total,
            created: host.now(),
            period_count,
        });
    Ok(())
}

/// Pay out a matured refund and erase the row
pub(crate) fn refund<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    owner: &AccountName,
) -> Result<()> {
    host.require_auth(owner)?;

    let req = ledger
        .refunds
        .get(owner)
        .ok_or_else(|| EconomyError::RefundNotFound(owner.clone()))?;
    if req.request_time.saturating_add_secs(REFUND_DELAY_SECS) > host.now() {
        return Err(EconomyError::RefundNotDue);
    }

    let total = req.net_amount.checked_add(req.cpu_amount)?;
    debug!("paying out refund of {total} to {owner}");
    fx.transfer(constants::stake_account(), owner.clone(), total, "unstake");
    ledger.refunds.remove(owner);
    Ok(())
}

/// Apply one signed stake delta atomically across all bandwidth tables
#[allow(clippy::too_many_arguments)]
pub(crate) fn changebw<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    from: &AccountName,
    receiver: &AccountName,
    stake_net_delta: Asset,
    stake_cpu_delta: Asset,
    transfer: bool,
) -> Result<()> {
    ensure_core(stake_net_delta)?;
    ensure_core(stake_cpu_delta)?;

    let swap = stake_net_delta.is_negative() && stake_cpu_delta.is_negative();
    if swap {
        host.require_auth(receiver)?;
    } else {
        host.require_auth(from)?;
    }
    if !ledger.global.resources_market_open && !host.is_privileged(from) {
        return Err(EconomyError::MarketClosed);
    }
    if stake_net_delta.is_zero() && stake_cpu_delta.is_zero() {
        return Err(EconomyError::ZeroStakeDelta);
    }
    let combined = stake_net_delta.checked_add(stake_cpu_delta)?;
    if combined.amount().unsigned_abs()
        < stake_net_delta
            .amount()
            .unsigned_abs()
            .max(stake_cpu_delta.amount().unsigned_abs())
    {
        return Err(EconomyError::OppositeSignDeltas);
    }

    let source_stake_from = from.clone();
    let from = if transfer {
        receiver.clone()
    } else {
        from.clone()
    };
    let receiver = receiver.clone();

    // the account whose tokens fund (or reclaim) this stake; under swap the
    // delegator sits in the receiver argument
    let stake_owner = if swap { receiver.clone() } else { from.clone() };

    // delegation row: [delegator][delegatee]
    let (scope, key) = if swap {
        (receiver.clone(), from.clone())
    } else {
        (from.clone(), receiver.clone())
    };
    {
        let table = ledger.delegations.entry(scope.clone()).or_default();
        let row = table.entry(key.clone()).or_insert_with(|| DelegatedStake {
            from: scope.clone(),
            to: key.clone(),
            net_weight: Asset::zero(CORE_SYMBOL),
            cpu_weight: Asset::zero(CORE_SYMBOL),
        });
        row.net_weight = row.net_weight.checked_add(stake_net_delta)?;
        row.cpu_weight = row.cpu_weight.checked_add(stake_cpu_delta)?;
        if row.net_weight.is_negative() {
            return Err(EconomyError::InsufficientNetStake);
        }
        if row.cpu_weight.is_negative() {
            return Err(EconomyError::InsufficientCpuStake);
        }
    }
    ledger.prune_delegation(&scope, &key);

    // totals of the account holding the stake
    let totals_owner = if swap { from.clone() } else { receiver.clone() };
    {
        let tot = ledger
            .totals
            .entry(totals_owner.clone())
            .or_insert_with(|| AccountResourceTotals::empty(totals_owner.clone()));
        tot.net_weight = tot.net_weight.checked_add(stake_net_delta)?;
        tot.cpu_weight = tot.cpu_weight.checked_add(stake_cpu_delta)?;
        if tot.net_weight.is_negative() {
            return Err(EconomyError::InsufficientTotalNetStake);
        }
        if tot.cpu_weight.is_negative() {
            return Err(EconomyError::InsufficientTotalCpuStake);
        }
        debug!(
            "totals for {totals_owner}: net {} cpu {}",
            tot.net_weight, tot.cpu_weight
        );
        fx.set_resource_limits(
            totals_owner.clone(),
            tot.ram_bytes,
            tot.net_weight.amount(),
            tot.cpu_weight.amount(),
        );
    }
    ledger.prune_totals(&totals_owner);

    // refund bookkeeping; pointless for the custody account itself
    if source_stake_from != constants::stake_account() {
        let mut net_balance = stake_net_delta;
        let mut cpu_balance = stake_cpu_delta;
        let mut need_deferred = false;

        let is_undelegating = combined.is_negative();
        let is_delegating_to_self = !transfer && from == receiver;

        if is_delegating_to_self || is_undelegating {
            match ledger.refunds.get_mut(&stake_owner) {
                Some(req) => {
                    if net_balance.is_negative() || cpu_balance.is_negative() {
                        req.request_time = host.now();
                    }
                    req.net_amount = req.net_amount.checked_sub(net_balance)?;
                    if req.net_amount.is_negative() {
                        net_balance = req.net_amount.checked_neg()?;
                        req.net_amount = Asset::zero(CORE_SYMBOL);
                    } else {
                        net_balance = Asset::zero(CORE_SYMBOL);
                    }
                    req.cpu_amount = req.cpu_amount.checked_sub(cpu_balance)?;
                    if req.cpu_amount.is_negative() {
                        cpu_balance = req.cpu_amount.checked_neg()?;
                        req.cpu_amount = Asset::zero(CORE_SYMBOL);
                    } else {
                        cpu_balance = Asset::zero(CORE_SYMBOL);
                    }

                    // should never happen
                    if req.net_amount.is_negative() || req.cpu_amount.is_negative() {
                        return Err(EconomyError::NegativeRefund);
                    }

                    if req.is_empty() {
                        ledger.refunds.remove(&stake_owner);
                        need_deferred = false;
                    } else {
                        need_deferred = true;
                    }
                }
                None => {
                    if net_balance.is_negative() || cpu_balance.is_negative() {
                        let mut req = RefundRequest {
                            owner: stake_owner.clone(),
                            request_time: host.now(),
                            net_amount: Asset::zero(CORE_SYMBOL),
                            cpu_amount: Asset::zero(CORE_SYMBOL),
                        };
                        if net_balance.is_negative() {
                            req.net_amount = net_balance.checked_neg()?;
                            net_balance = Asset::zero(CORE_SYMBOL);
                        }
                        if cpu_balance.is_negative() {
                            req.cpu_amount = cpu_balance.checked_neg()?;
                            cpu_balance = Asset::zero(CORE_SYMBOL);
                        }
                        ledger.refunds.insert(stake_owner.clone(), req);
                        need_deferred = true;
                    }
                }
            }
        }

        // destinations cannot hold two deferred tasks: always clear before
        // rescheduling; cancel alone is idempotent
        if need_deferred {
            fx.cancel_refund(stake_owner.clone());
            fx.schedule_refund(stake_owner.clone(), REFUND_DELAY_SECS);
        } else {
            fx.cancel_refund(stake_owner.clone());
        }

        let transfer_amount = net_balance.checked_add(cpu_balance)?;
        if transfer_amount.is_positive() {
            fx.transfer(
                source_stake_from.clone(),
                constants::stake_account(),
                transfer_amount,
                "stake bandwidth",
            );
        }
    }

    // voter stake counter
    {
        let voter = ledger
            .voters
            .entry(stake_owner.clone())
            .or_insert_with(|| VoterStakeRecord::empty(stake_owner.clone()));
        voter.staked = voter
            .staked
            .checked_add(combined.amount())
            .ok_or(CoreError::AmountOverflow)?;
        if voter.staked < 0 {
            return Err(EconomyError::NegativeVoterStake);
        }
        if stake_owner == constants::genesis_vesting_account() {
            validate_genesis_vesting(voter.staked, host.now())?;
        }
        if !voter.producers.is_empty() || voter.proxy.is_some() {
            fx.update_votes(
                stake_owner.clone(),
                voter.proxy.clone(),
                voter.producers.clone(),
                false,
            );
        }
    }

    Ok(())
}

/// Cap on how fast the genesis allocation may unstake
///
/// The allocation vests linearly over ten years from chain launch; the
/// staked balance may never fall below the still-unvested remainder.
fn validate_genesis_vesting(staked: i64, now: TimePointSec) -> Result<()> {
    let horizon = GENESIS_VESTING_YEARS * SECONDS_PER_YEAR;
    let elapsed = now
        .elapsed_since(TimePointSec::from_secs(GENESIS_EPOCH_SECS))
        .min(horizon);
    let claimable =
        (i128::from(MAX_GENESIS_CLAIMABLE) * i128::from(elapsed) / i128::from(horizon)) as i64;

    if MAX_GENESIS_CLAIMABLE - claimable > staked {
        return Err(EconomyError::GenesisVestingViolated);
    }
    Ok(())
}

fn ensure_core(quantity: Asset) -> Result<()> {
    if quantity.symbol() != CORE_SYMBOL {
        return Err(EconomyError::WrongStakeCurrency(quantity));
    }
    Ok(())
}
