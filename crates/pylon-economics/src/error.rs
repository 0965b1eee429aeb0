//! Error types for economy operations
//!
//! Every public action validates its preconditions and aborts with one of
//! these errors; the surrounding platform surfaces the abort to the caller.
//! Nothing is retried internally, and a failed action leaves the ledger
//! exactly as it was. Invariants believed unreachable (negative refund
//! amounts, negative aggregate RAM stake) are still checked and reported
//! rather than clamped.

use pylon_core::{AccountName, Asset, CoreError};
use thiserror::Error;

/// Result type alias for economy operations
pub type Result<T> = std::result::Result<T, EconomyError>;

/// Errors that abort a resource-economy action
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    // === Authorization ===
    /// Required authority was not provided
    #[error("missing authority of {0}")]
    MissingAuthority(AccountName),

    /// Resource markets are closed and the actor is not privileged
    #[error("resource market must be open or the account must be privileged")]
    MarketClosed,

    // === RAM market ===
    /// Purchase amount must be strictly positive
    #[error("must purchase a positive amount")]
    NonPositivePurchase,

    /// Byte count to sell must be strictly positive
    #[error("cannot sell a non-positive number of bytes")]
    NonPositiveSale,

    /// Conversion input is not one of the market's two reserve currencies
    #[error("cannot convert {0} on the RAM market")]
    UnsupportedConversion(Asset),

    /// A conversion would empty or overdraw a reserve
    #[error("market reserves must stay positive")]
    ReserveDepleted,

    /// Purchase after fees converts to zero bytes
    #[error("must reserve a positive amount")]
    NonPositiveReserve,

    /// Sale proceeds too small to cover the fee floor
    #[error("token amount received from selling ram is too low")]
    SaleProceedsTooLow,

    /// Account has no resource row to sell from
    #[error("no resource row for account {0}")]
    NoResourceRow(AccountName),

    /// Account owns fewer RAM bytes than it is trying to sell
    #[error("insufficient ram quota")]
    InsufficientRamQuota,

    /// Aggregate RAM stake went negative (should never happen)
    #[error("attempt to unstake more tokens than previously staked")]
    RamStakeUnderflow,

    // === Staking ===
    /// Stake quantities must be non-negative and sum to a positive amount
    #[error("must stake a positive amount")]
    NonPositiveStake,

    /// Unstake quantities must be non-negative and sum to a positive amount
    #[error("must unstake a positive amount")]
    NonPositiveUnstake,

    /// Stake must be quoted in the core currency
    #[error("stake must be quoted in the core currency, not {0}")]
    WrongStakeCurrency(Asset),

    /// Transfer flag is meaningless when delegating to oneself
    #[error("cannot use transfer flag if delegating to self")]
    TransferToSelf,

    /// Both stake deltas are zero
    #[error("should stake non-zero amount")]
    ZeroStakeDelta,

    /// Net and CPU deltas move in opposite directions
    #[error("net and cpu deltas cannot be opposite signs")]
    OppositeSignDeltas,

    /// Delegation row would go negative on the net component
    #[error("insufficient staked net bandwidth")]
    InsufficientNetStake,

    /// Delegation row would go negative on the CPU component
    #[error("insufficient staked cpu bandwidth")]
    InsufficientCpuStake,

    /// Totals row would go negative on the net component
    #[error("insufficient total staked net bandwidth")]
    InsufficientTotalNetStake,

    /// Totals row would go negative on the CPU component
    #[error("insufficient total staked cpu bandwidth")]
    InsufficientTotalCpuStake,

    /// No delegation exists from which to undelegate
    #[error("no stake delegated from {from} to {to}")]
    UnknownDelegation { from: AccountName, to: AccountName },

    /// Escrow locks leave less unlocked stake than requested
    #[error("cannot unstake this amount at the moment, {available} available")]
    InsufficientUnlockedStake { available: Asset },

    /// Escrow schedules need at least one vesting period
    #[error("escrow period count must be positive")]
    ZeroPeriodCount,

    /// Chain-wide activation threshold not yet reached
    #[error("cannot undelegate bandwidth until at least 10% of the token supply participates in voting")]
    ChainNotActivated,

    // === Refunds ===
    /// No pending refund for the account
    #[error("refund request not found for {0}")]
    RefundNotFound(AccountName),

    /// Refund delay has not elapsed
    #[error("refund is not available yet")]
    RefundNotDue,

    /// A refund component went negative (should never happen)
    #[error("negative refund amount")]
    NegativeRefund,

    // === Voting ===
    /// Voter stake counter would go negative
    #[error("stake for voting cannot be negative")]
    NegativeVoterStake,

    /// Genesis stake may only be claimed linearly over ten years
    #[error("genesis stake can only be claimed over {} years", crate::constants::GENESIS_VESTING_YEARS)]
    GenesisVestingViolated,

    // === Arithmetic ===
    /// Checked asset arithmetic failed
    #[error(transparent)]
    Arithmetic(#[from] CoreError),
}
