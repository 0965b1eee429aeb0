//! Ledger tables of the resource economy
//!
//! All persistent state lives in one [`Ledger`] value: ordered maps keyed by
//! a scope account plus a primary key, the RAM market reserves, and a small
//! set of global counters. The ledger is passed explicitly to every
//! operation (there is no ambient singleton), which keeps the core testable
//! and makes the atomic commit (clone, mutate, swap) trivial.
//!
//! Row lifecycle rules are part of the data model: a delegation row with both
//! weights at zero is erased, a totals row is erased only when net, CPU *and*
//! RAM are all zero, and a refund row is erased the moment both components
//! reach zero.

use crate::constants::CORE_SYMBOL;
use crate::escrow::EscrowRecord;
use crate::market::RamMarket;
use pylon_core::{AccountName, Asset, TimePointSec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stake delegated from one account to another
///
/// Scoped by `from`, keyed by `to`. Both weights stay non-negative; the row
/// is erased when both reach exactly zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelegatedStake {
    pub from: AccountName,
    pub to: AccountName,
    pub net_weight: Asset,
    pub cpu_weight: Asset,
}

impl DelegatedStake {
    /// True when both weights are exactly zero
    pub fn is_empty(&self) -> bool {
        self.net_weight.is_zero() && self.cpu_weight.is_zero()
    }
}

/// Aggregate resources of one account
///
/// Sums every inbound delegation plus owned RAM. These totals are what the
/// platform's resource-limit enforcement consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountResourceTotals {
    pub owner: AccountName,
    pub net_weight: Asset,
    pub cpu_weight: Asset,
    pub ram_bytes: i64,
}

impl AccountResourceTotals {
    /// Fresh all-zero totals row for `owner`
    pub fn empty(owner: AccountName) -> Self {
        Self {
            owner,
            net_weight: Asset::zero(CORE_SYMBOL),
            cpu_weight: Asset::zero(CORE_SYMBOL),
            ram_bytes: 0,
        }
    }

    /// True when net, CPU and RAM are all zero
    pub fn is_empty(&self) -> bool {
        self.net_weight.is_zero() && self.cpu_weight.is_zero() && self.ram_bytes == 0
    }
}

/// Pending withdrawal of unstaked tokens
///
/// At most one per owner. Amounts only decrease toward zero as new stake
/// arrives, or the whole row is paid out once the refund delay elapses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub owner: AccountName,
    pub request_time: TimePointSec,
    pub net_amount: Asset,
    pub cpu_amount: Asset,
}

impl RefundRequest {
    /// True when both components are exactly zero
    pub fn is_empty(&self) -> bool {
        self.net_amount.is_zero() && self.cpu_amount.is_zero()
    }
}

/// Voter stake counter
///
/// Delegation lists and proxy assignment belong to the voting subsystem; the
/// economy only moves `staked` and hands the rest through to vote
/// propagation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoterStakeRecord {
    pub owner: AccountName,
    pub staked: i64,
    pub proxy: Option<AccountName>,
    pub producers: Vec<AccountName>,
}

impl VoterStakeRecord {
    /// Fresh zero-stake record for `owner`
    pub fn empty(owner: AccountName) -> Self {
        Self {
            owner,
            staked: 0,
            proxy: None,
            producers: Vec::new(),
        }
    }
}

/// Chain-wide counters and gates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Bytes sold out of the market so far
    pub total_ram_bytes_reserved: u64,
    /// Core tokens held against sold RAM, net of fees
    pub total_ram_stake: i64,
    /// Stake participating in voting; gates undelegation
    pub total_activated_stake: i64,
    /// Whether the resource markets are open to unprivileged accounts
    pub resources_market_open: bool,
}

/// The whole persisted state of the resource economy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// scope = delegator, key = recipient
    pub(crate) delegations: BTreeMap<AccountName, BTreeMap<AccountName, DelegatedStake>>,
    /// key = owner
    pub(crate) totals: BTreeMap<AccountName, AccountResourceTotals>,
    /// key = owner; at most one row each
    pub(crate) refunds: BTreeMap<AccountName, RefundRequest>,
    /// scope = stake holder; buckets in creation order
    pub(crate) escrows: BTreeMap<AccountName, Vec<EscrowRecord>>,
    /// key = voter
    pub(crate) voters: BTreeMap<AccountName, VoterStakeRecord>,
    /// The RAM reserve pair
    pub(crate) market: RamMarket,
    /// Global counters and gates
    pub(crate) global: GlobalState,
}

impl Ledger {
    /// Empty ledger over a freshly opened RAM market
    pub fn new(market: RamMarket) -> Self {
        Self {
            delegations: BTreeMap::new(),
            totals: BTreeMap::new(),
            refunds: BTreeMap::new(),
            escrows: BTreeMap::new(),
            voters: BTreeMap::new(),
            market,
            global: GlobalState::default(),
        }
    }

    /// Delegation row from `from` to `to`, if any
    pub fn delegation(&self, from: &AccountName, to: &AccountName) -> Option<&DelegatedStake> {
        self.delegations.get(from).and_then(|scope| scope.get(to))
    }

    /// Resource totals of `owner`, if any
    pub fn totals(&self, owner: &AccountName) -> Option<&AccountResourceTotals> {
        self.totals.get(owner)
    }

    /// Pending refund of `owner`, if any
    pub fn refund(&self, owner: &AccountName) -> Option<&RefundRequest> {
        self.refunds.get(owner)
    }

    /// Escrow buckets scoped to `holder`, oldest first
    pub fn escrows(&self, holder: &AccountName) -> &[EscrowRecord] {
        self.escrows.get(holder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Voter record of `owner`, if any
    pub fn voter(&self, owner: &AccountName) -> Option<&VoterStakeRecord> {
        self.voters.get(owner)
    }

    /// The RAM market reserves
    pub fn market(&self) -> &RamMarket {
        &self.market
    }

    /// Global counters and gates
    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    /// Drop the delegation row (and scope) if both weights reached zero
    pub(crate) fn prune_delegation(&mut self, scope: &AccountName, key: &AccountName) {
        if let Some(table) = self.delegations.get_mut(scope) {
            if table.get(key).is_some_and(DelegatedStake::is_empty) {
                table.remove(key);
            }
            if table.is_empty() {
                self.delegations.remove(scope);
            }
        }
    }

    /// Drop the totals row if net, CPU and RAM are all zero
    pub(crate) fn prune_totals(&mut self, owner: &AccountName) {
        if self
            .totals
            .get(owner)
            .is_some_and(AccountResourceTotals::is_empty)
        {
            self.totals.remove(owner);
        }
    }
}
