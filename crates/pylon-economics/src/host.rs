//! Platform services consumed by the economy
//!
//! The economy never executes token transfers, enforces throughput limits,
//! schedules deferred work, or tallies votes itself; those are platform
//! services reached through the [`Host`] trait. Queries (`require_auth`,
//! `is_privileged`, `now`) run while an operation validates; mutating calls
//! are buffered as [`Effect`]s and replayed against the host only after the
//! ledger mutation commits, so an aborted operation produces no external
//! side effects at all.
//!
//! The deferred-payout contract: at most one outstanding refund task per
//! owner, scheduling always cancels the prior task first, and cancelling a
//! task that does not exist is a no-op.

use crate::error::Result;
use pylon_core::{AccountName, Asset, TimePointSec};

/// External platform interface
pub trait Host {
    /// Fail unless the caller carries `account`'s authority
    fn require_auth(&self, account: &AccountName) -> Result<()>;

    /// Whether `account` may bypass the market-open gate
    fn is_privileged(&self, account: &AccountName) -> bool;

    /// Current chain time; sampled once per operation
    fn now(&self) -> TimePointSec;

    /// Push an account's enforced throughput quotas
    fn set_resource_limits(
        &mut self,
        owner: &AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    );

    /// Execute a token transfer on the external token ledger
    fn transfer(&mut self, from: &AccountName, to: &AccountName, quantity: Asset, memo: &str);

    /// Schedule the automatic refund payout for `owner` after `delay_secs`
    ///
    /// Implementations must replace any task already pending for `owner`.
    fn schedule_refund(&mut self, owner: &AccountName, delay_secs: u64);

    /// Cancel the pending refund task for `owner`, if any (idempotent)
    fn cancel_refund(&mut self, owner: &AccountName);

    /// Propagate a voter's new stake into the vote tallies
    fn update_votes(
        &mut self,
        voter: &AccountName,
        proxy: Option<&AccountName>,
        producers: &[AccountName],
        recompute: bool,
    );
}

/// One buffered external call
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    SetResourceLimits {
        owner: AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    },
    Transfer {
        from: AccountName,
        to: AccountName,
        quantity: Asset,
        memo: String,
    },
    ScheduleRefund {
        owner: AccountName,
        delay_secs: u64,
    },
    CancelRefund {
        owner: AccountName,
    },
    UpdateVotes {
        voter: AccountName,
        proxy: Option<AccountName>,
        producers: Vec<AccountName>,
        recompute: bool,
    },
}

/// Ordered buffer of external calls, replayed after commit
#[derive(Debug, Default)]
pub(crate) struct EffectLog {
    effects: Vec<Effect>,
}

impl EffectLog {
    pub(crate) fn set_resource_limits(
        &mut self,
        owner: AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    ) {
        self.effects.push(Effect::SetResourceLimits {
            owner,
            ram_bytes,
            net_weight,
            cpu_weight,
        });
    }

    pub(crate) fn transfer(
        &mut self,
        from: AccountName,
        to: AccountName,
        quantity: Asset,
        memo: &str,
    ) {
        self.effects.push(Effect::Transfer {
            from,
            to,
            quantity,
            memo: memo.to_string(),
        });
    }

    pub(crate) fn schedule_refund(&mut self, owner: AccountName, delay_secs: u64) {
        self.effects.push(Effect::ScheduleRefund { owner, delay_secs });
    }

    pub(crate) fn cancel_refund(&mut self, owner: AccountName) {
        self.effects.push(Effect::CancelRefund { owner });
    }

    pub(crate) fn update_votes(
        &mut self,
        voter: AccountName,
        proxy: Option<AccountName>,
        producers: Vec<AccountName>,
        recompute: bool,
    ) {
        self.effects.push(Effect::UpdateVotes {
            voter,
            proxy,
            producers,
            recompute,
        });
    }

    /// Replay every buffered call against the host, in order
    pub(crate) fn replay<H: Host>(self, host: &mut H) {
        for effect in self.effects {
            match effect {
                Effect::SetResourceLimits {
                    owner,
                    ram_bytes,
                    net_weight,
                    cpu_weight,
                } => host.set_resource_limits(&owner, ram_bytes, net_weight, cpu_weight),
                Effect::Transfer {
                    from,
                    to,
                    quantity,
                    memo,
                } => host.transfer(&from, &to, quantity, &memo),
                Effect::ScheduleRefund { owner, delay_secs } => {
                    host.schedule_refund(&owner, delay_secs)
                }
                Effect::CancelRefund { owner } => host.cancel_refund(&owner),
                Effect::UpdateVotes {
                    voter,
                    proxy,
                    producers,
                    recompute,
                } => host.update_votes(&voter, proxy.as_ref(), &producers, recompute),
            }
        }
    }
}
