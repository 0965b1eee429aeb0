//! Public action surface of the resource economy
//!
//! [`ResourceEconomy`] owns the ledger and exposes the platform actions.
//! Every action runs under [`ResourceEconomy::commit`]: the operation
//! mutates a scratch copy of the ledger and buffers its external calls; on
//! success the scratch state replaces the live state and the buffered
//! effects are replayed against the host, in order. On failure nothing is
//! committed and no external call is made: failure before the final step
//! leaves all state exactly as before the call.

use crate::bandwidth;
use crate::error::Result;
use crate::host::{EffectLog, Host};
use crate::ledger::Ledger;
use crate::market::RamMarket;
use crate::ram;
use pylon_core::{AccountName, Asset};

/// The resource-economy contract state and its actions
#[derive(Clone, Debug)]
pub struct ResourceEconomy {
    ledger: Ledger,
}

impl ResourceEconomy {
    /// Fresh economy over a newly opened RAM market
    pub fn new(market: RamMarket) -> Self {
        Self {
            ledger: Ledger::new(market),
        }
    }

    /// Rehydrate from previously persisted state
    pub fn from_ledger(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Read access to the persisted state
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Open or close the resource markets to unprivileged accounts
    pub fn set_market_open(&mut self, open: bool) {
        self.ledger.global.resources_market_open = open;
    }

    /// Record the chain-wide activated stake reported by the voting subsystem
    pub fn set_total_activated_stake(&mut self, stake: i64) {
        self.ledger.global.total_activated_stake = stake;
    }

    /// Mirror a voter's proxy and producer list from the voting subsystem
    ///
    /// The economy only reads these to decide whether a stake change must be
    /// propagated into the vote tallies.
    pub fn set_voter_info(
        &mut self,
        owner: &AccountName,
        proxy: Option<AccountName>,
        producers: Vec<AccountName>,
    ) {
        let voter = self
            .ledger
            .voters
            .entry(owner.clone())
            .or_insert_with(|| crate::ledger::VoterStakeRecord::empty(owner.clone()));
        voter.proxy = proxy;
        voter.producers = producers;
    }

    /// Buy an exact byte count at the prevailing market price
    pub fn buyrambytes<H: Host>(
        &mut self,
        host: &mut H,
        payer: &AccountName,
        receiver: &AccountName,
        bytes: u32,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            ram::buyrambytes(ledger, fx, host, payer, receiver, bytes)
        })
    }

    /// Spend core tokens on RAM for `receiver`
    pub fn buyram<H: Host>(
        &mut self,
        host: &mut H,
        payer: &AccountName,
        receiver: &AccountName,
        quant: Asset,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            ram::buyram(ledger, fx, host, payer, receiver, quant)
        })
    }

    /// Sell owned RAM back to the market
    pub fn sellram<H: Host>(
        &mut self,
        host: &mut H,
        account: &AccountName,
        bytes: i64,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            ram::sellram(ledger, fx, host, account, bytes)
        })
    }

    /// Stake bandwidth for `receiver`
    pub fn delegatebw<H: Host>(
        &mut self,
        host: &mut H,
        from: &AccountName,
        receiver: &AccountName,
        stake_net_quantity: Asset,
        stake_cpu_quantity: Asset,
        transfer: bool,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            bandwidth::delegatebw(
                ledger,
                fx,
                host,
                from,
                receiver,
                stake_net_quantity,
                stake_cpu_quantity,
                transfer,
            )
        })
    }

    /// Unstake previously delegated bandwidth
    pub fn undelegatebw<H: Host>(
        &mut self,
        host: &mut H,
        from: &AccountName,
        receiver: &AccountName,
        unstake_net_quantity: Asset,
        unstake_cpu_quantity: Asset,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            bandwidth::undelegatebw(
                ledger,
                fx,
                host,
                from,
                receiver,
                unstake_net_quantity,
                unstake_cpu_quantity,
            )
        })
    }

    /// Stake bandwidth under a linear vesting schedule
    #[allow(clippy::too_many_arguments)]
    pub fn escrowbw<H: Host>(
        &mut self,
        host: &mut H,
        from: &AccountName,
        receiver: &AccountName,
        stake_net_quantity: Asset,
        stake_cpu_quantity: Asset,
        transfer: bool,
        period_count: u8,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            bandwidth::escrowbw(
                ledger,
                fx,
                host,
                from,
                receiver,
                stake_net_quantity,
                stake_cpu_quantity,
                transfer,
                period_count,
            )
        })
    }

    /// Apply a raw signed stake delta
    pub fn changebw<H: Host>(
        &mut self,
        host: &mut H,
        from: &AccountName,
        receiver: &AccountName,
        stake_net_delta: Asset,
        stake_cpu_delta: Asset,
        transfer: bool,
    ) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            bandwidth::changebw(
                ledger,
                fx,
                host,
                from,
                receiver,
                stake_net_delta,
                stake_cpu_delta,
                transfer,
            )
        })
    }

    /// Claim a matured refund
    pub fn refund<H: Host>(&mut self, host: &mut H, owner: &AccountName) -> Result<()> {
        self.commit(host, |ledger, fx, host| {
            bandwidth::refund(ledger, fx, host, owner)
        })
    }

    /// Run one operation atomically: scratch ledger, buffered effects,
    /// commit-then-replay on success only
    fn commit<H, F>(&mut self, host: &mut H, op: F) -> Result<()>
    where
        H: Host,
        F: FnOnce(&mut Ledger, &mut EffectLog, &H) -> Result<()>,
    {
        let mut scratch = self.ledger.clone();
        let mut fx = EffectLog::default();
        op(&mut scratch, &mut fx, &*host)?;
        self.ledger = scratch;
        fx.replay(host);
        Ok(())
    }
}
