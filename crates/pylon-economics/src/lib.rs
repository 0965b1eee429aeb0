//! # Pylon Economics - Resource Ledger, RAM Market & Stake Vesting
//!
//! The resource economy of the Pylon platform. Accounts stake core tokens in
//! exchange for network/CPU bandwidth quota and buy storage ("RAM") through a
//! continuous-reserve bancor market. Unstaking is gated by a mandatory refund
//! delay and, for escrowed grants, by a periodic vesting schedule.
//!
//! ## Public Actions
//!
//! | Action | Purpose |
//! |--------|---------|
//! | `buyrambytes` | Buy an exact byte count at the prevailing market price |
//! | `buyram` | Spend core tokens on RAM (0.5% round-up fee on the input) |
//! | `sellram` | Sell RAM back to the market (0.5% round-up fee on the output) |
//! | `delegatebw` | Stake tokens as net/CPU bandwidth for an account |
//! | `undelegatebw` | Unstake bandwidth, subject to escrow locks and the refund delay |
//! | `escrowbw` | Stake with a linear vesting schedule over fixed periods |
//! | `changebw` | Signed stake-delta transaction underlying delegate/undelegate |
//! | `refund` | Claim a matured pending refund |
//!
//! ## Atomicity
//!
//! Every action is a single atomic unit of work. An operation runs against a
//! scratch copy of the [`ledger::Ledger`] while external calls (token
//! transfers, resource-limit updates, deferred-task scheduling, vote
//! propagation) accumulate in an effect buffer. Only when the operation
//! succeeds is the scratch ledger committed and the buffered effects replayed
//! against the [`host::Host`], so a failed precondition can never leave a
//! partial mutation or a stray transfer behind.
//!
//! ## External collaborators
//!
//! Authorization, token transfer execution, per-account throughput
//! enforcement, deferred-task scheduling, and vote tallying are platform
//! services reached through the [`host::Host`] trait; this crate only defines
//! the contract it consumes.

pub mod bandwidth;
pub mod contract;
pub mod error;
pub mod escrow;
pub mod host;
pub mod ledger;
pub mod market;
pub mod ram;

// Re-exports
pub use contract::ResourceEconomy;
pub use error::{EconomyError, Result};
pub use escrow::EscrowRecord;
pub use host::{Effect, Host};
pub use ledger::{
    AccountResourceTotals, DelegatedStake, GlobalState, Ledger, RefundRequest, VoterStakeRecord,
};
pub use market::RamMarket;

/// Economy constants
pub mod constants {
    use pylon_core::{AccountName, Symbol};

    /// Core currency: 4 decimal places
    pub const CORE_SYMBOL: Symbol = Symbol::new("PYL", 4);

    /// Synthetic RAM-byte unit: 0 decimal places, one unit per byte
    pub const RAM_SYMBOL: Symbol = Symbol::new("RAM", 0);

    /// Delay between an unstake request and the refund becoming payable
    pub const REFUND_DELAY_SECS: u64 = 3 * 24 * 3600;

    /// Length of one escrow vesting period (~6 months)
    pub const ESCROW_PERIOD_SECS: u64 = 15_768_000;

    /// RAM fee divisor: fee = ceil(amount / 200), i.e. 0.5% rounded up
    pub const RAM_FEE_DIVISOR: i64 = 200;

    /// Seconds per year (52 weeks)
    pub const SECONDS_PER_YEAR: u64 = 52 * 7 * 24 * 3600;

    /// Chain launch, 2026-01-01T00:00:00Z
    pub const GENESIS_EPOCH_SECS: u64 = 1_767_225_600;

    /// Years over which the genesis allocation vests linearly
    pub const GENESIS_VESTING_YEARS: u64 = 10;

    /// Genesis allocation subject to the 10-year vesting cap (100M PYL)
    pub const MAX_GENESIS_CLAIMABLE: i64 = 100_000_000_0000;

    /// Stake that must participate in voting before undelegation opens
    /// (10% of the 1B PYL supply)
    pub const MIN_ACTIVATED_STAKE: i64 = 100_000_000_0000;

    /// Account that holds all staked tokens in custody
    pub const STAKE_ACCOUNT: &str = "pylon.stake";

    /// Account that holds the core tokens backing the RAM market
    pub const RAM_ACCOUNT: &str = "pylon.ram";

    /// Account that collects RAM trading fees
    pub const RAM_FEE_ACCOUNT: &str = "pylon.ramfee";

    /// Founder account whose stake vests linearly over ten years
    pub const GENESIS_VESTING_ACCOUNT: &str = "pylon.found";

    /// The stake custody account as an [`AccountName`]
    pub fn stake_account() -> AccountName {
        AccountName::from(STAKE_ACCOUNT)
    }

    /// The RAM custody account as an [`AccountName`]
    pub fn ram_account() -> AccountName {
        AccountName::from(RAM_ACCOUNT)
    }

    /// The RAM fee account as an [`AccountName`]
    pub fn ram_fee_account() -> AccountName {
        AccountName::from(RAM_FEE_ACCOUNT)
    }

    /// The vesting founder account as an [`AccountName`]
    pub fn genesis_vesting_account() -> AccountName {
        AccountName::from(GENESIS_VESTING_ACCOUNT)
    }
}
