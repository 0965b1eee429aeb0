//! RAM market actions
//!
//! Buying RAM irreversibly transfers core tokens to the market custody
//! account; only the receiver can reclaim them by selling the bytes back.
//! Byte supply is fixed at market creation, so the bancor reserves balance
//! supply and demand over time. Both directions charge a 0.5% round-up fee:
//! on the input when buying, on the proceeds when selling.

use crate::constants::{self, CORE_SYMBOL, RAM_FEE_DIVISOR, RAM_SYMBOL};
use crate::error::{EconomyError, Result};
use crate::host::{EffectLog, Host};
use crate::ledger::{AccountResourceTotals, Ledger};
use log::debug;
use pylon_core::{AccountName, Asset, CoreError};

/// Buy an exact number of bytes at the prevailing market price
///
/// Prices the bytes on a copy of the reserves (the real conversion happens
/// inside the delegated [`buyram`]), then bills the payer that amount.
pub(crate) fn buyrambytes<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    payer: &AccountName,
    receiver: &AccountName,
    bytes: u32,
) -> Result<()> {
    let quote = ledger
        .market
        .peek_convert(Asset::new(i64::from(bytes), RAM_SYMBOL))?;
    buyram(ledger, fx, host, payer, receiver, quote)
}

/// Spend `quant` core tokens on RAM for `receiver`
pub(crate) fn buyram<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    payer: &AccountName,
    receiver: &AccountName,
    quant: Asset,
) -> Result<()> {
    host.require_auth(payer)?;
    if quant.symbol() != CORE_SYMBOL {
        return Err(EconomyError::UnsupportedConversion(quant));
    }
    if !quant.is_positive() {
        return Err(EconomyError::NonPositivePurchase);
    }
    if !ledger.global.resources_market_open && !host.is_privileged(payer) {
        return Err(EconomyError::MarketClosed);
    }

    // 0.5% fee, rounded up; nonzero whenever quant is
    let fee = quant.with_amount(ram_fee(quant.amount()));
    let quant_after_fee = quant.checked_sub(fee)?;

    fx.transfer(
        payer.clone(),
        constants::ram_account(),
        quant_after_fee,
        "buy ram",
    );
    if fee.is_positive() {
        fx.transfer(payer.clone(), constants::ram_fee_account(), fee, "ram fee");
    }

    let bytes_out = ledger.market.convert(quant_after_fee)?;
    if !bytes_out.is_positive() {
        return Err(EconomyError::NonPositiveReserve);
    }
    debug!("{payer} bought {bytes_out} for {receiver} at {quant_after_fee}");

    ledger.global.total_ram_bytes_reserved = ledger
        .global
        .total_ram_bytes_reserved
        .checked_add(bytes_out.amount() as u64)
        .ok_or(CoreError::AmountOverflow)?;
    ledger.global.total_ram_stake = ledger
        .global
        .total_ram_stake
        .checked_add(quant_after_fee.amount())
        .ok_or(CoreError::AmountOverflow)?;

    let tot = ledger
        .totals
        .entry(receiver.clone())
        .or_insert_with(|| AccountResourceTotals::empty(receiver.clone()));
    tot.ram_bytes = tot
        .ram_bytes
        .checked_add(bytes_out.amount())
        .ok_or(CoreError::AmountOverflow)?;
    fx.set_resource_limits(
        receiver.clone(),
        tot.ram_bytes,
        tot.net_weight.amount(),
        tot.cpu_weight.amount(),
    );
    Ok(())
}

/// Sell `bytes` of the account's RAM back to the market
pub(crate) fn sellram<H: Host>(
    ledger: &mut Ledger,
    fx: &mut EffectLog,
    host: &H,
    account: &AccountName,
    bytes: i64,
) -> Result<()> {
    host.require_auth(account)?;
    if bytes <= 0 {
        return Err(EconomyError::NonPositiveSale);
    }
    let owned = ledger
        .totals
        .get(account)
        .ok_or_else(|| EconomyError::NoResourceRow(account.clone()))?
        .ram_bytes;
    if owned < bytes {
        return Err(EconomyError::InsufficientRamQuota);
    }

    let tokens_out = ledger.market.convert(Asset::new(bytes, RAM_SYMBOL))?;
    // a sale worth 0 or 1 smallest units would be swallowed by the fee floor
    if tokens_out.amount() <= 1 {
        return Err(EconomyError::SaleProceedsTooLow);
    }

    ledger.global.total_ram_bytes_reserved = ledger
        .global
        .total_ram_bytes_reserved
        .saturating_sub(bytes as u64);
    ledger.global.total_ram_stake -= tokens_out.amount();
    // should never happen
    if ledger.global.total_ram_stake < 0 {
        return Err(EconomyError::RamStakeUnderflow);
    }

    let tot = ledger
        .totals
        .get_mut(account)
        .ok_or_else(|| EconomyError::NoResourceRow(account.clone()))?;
    tot.ram_bytes -= bytes;
    fx.set_resource_limits(
        account.clone(),
        tot.ram_bytes,
        tot.net_weight.amount(),
        tot.cpu_weight.amount(),
    );
    ledger.prune_totals(account);

    debug!("{account} sold {bytes} bytes for {tokens_out}");
    fx.transfer(
        constants::ram_account(),
        account.clone(),
        tokens_out,
        "sell ram",
    );
    let fee = ram_fee(tokens_out.amount());
    if fee > 0 {
        fx.transfer(
            account.clone(),
            constants::ram_fee_account(),
            Asset::new(fee, CORE_SYMBOL),
            "sell ram fee",
        );
    }
    Ok(())
}

/// 0.5% fee rounded up: `ceil(amount / 200)`
///
/// Written without the usual add-then-divide so that amounts near
/// `i64::MAX` cannot overflow.
fn ram_fee(amount: i64) -> i64 {
    amount / RAM_FEE_DIVISOR + i64::from(amount % RAM_FEE_DIVISOR != 0)
}
