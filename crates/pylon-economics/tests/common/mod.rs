//! Shared test host: records every external call the economy makes

use pylon_economics::error::{EconomyError, Result};
use pylon_economics::Host;
use pylon_core::{AccountName, Asset, TimePointSec};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory platform double
///
/// Authorizes everyone except accounts in `deny`, and keeps a full record
/// of transfers, limit updates, scheduled refund tasks and vote updates so
/// tests can assert on the economy's trailing effects.
pub struct RecordingHost {
    pub now: u64,
    pub privileged: BTreeSet<AccountName>,
    pub deny: BTreeSet<AccountName>,
    pub transfers: Vec<(AccountName, AccountName, Asset, String)>,
    pub limits: BTreeMap<AccountName, (i64, i64, i64)>,
    /// owner -> payout due time (now + delay at scheduling)
    pub scheduled: BTreeMap<AccountName, u64>,
    pub vote_updates: Vec<AccountName>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            now: 1_767_225_600, // 2026-01-01
            privileged: BTreeSet::new(),
            deny: BTreeSet::new(),
            transfers: Vec::new(),
            limits: BTreeMap::new(),
            scheduled: BTreeMap::new(),
            vote_updates: Vec::new(),
        }
    }

    pub fn advance(&mut self, secs: u64) {
        self.now += secs;
    }

    /// Total amount transferred from `from` to `to` so far
    pub fn transferred(&self, from: &AccountName, to: &AccountName) -> i64 {
        self.transfers
            .iter()
            .filter(|(f, t, _, _)| f == from && t == to)
            .map(|(_, _, quantity, _)| quantity.amount())
            .sum()
    }
}

impl Host for RecordingHost {
    fn require_auth(&self, account: &AccountName) -> Result<()> {
        if self.deny.contains(account) {
            return Err(EconomyError::MissingAuthority(account.clone()));
        }
        Ok(())
    }

    fn is_privileged(&self, account: &AccountName) -> bool {
        self.privileged.contains(account)
    }

    fn now(&self) -> TimePointSec {
        TimePointSec::from_secs(self.now)
    }

    fn set_resource_limits(
        &mut self,
        owner: &AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    ) {
        self.limits
            .insert(owner.clone(), (ram_bytes, net_weight, cpu_weight));
    }

    fn transfer(&mut self, from: &AccountName, to: &AccountName, quantity: Asset, memo: &str) {
        self.transfers
            .push((from.clone(), to.clone(), quantity, memo.to_string()));
    }

    fn schedule_refund(&mut self, owner: &AccountName, delay_secs: u64) {
        self.scheduled.insert(owner.clone(), self.now + delay_secs);
    }

    fn cancel_refund(&mut self, owner: &AccountName) {
        // idempotent: cancelling an absent task is a no-op
        self.scheduled.remove(owner);
    }

    fn update_votes(
        &mut self,
        voter: &AccountName,
        _proxy: Option<&AccountName>,
        _producers: &[AccountName],
        _recompute: bool,
    ) {
        self.vote_updates.push(voter.clone());
    }
}
