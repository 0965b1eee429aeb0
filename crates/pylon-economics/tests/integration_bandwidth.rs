//! End-to-end staking walkthroughs: delegation, refunds, escrow vesting

mod common;

use common::RecordingHost;
use pylon_core::{AccountName, Asset, TimePointSec};
use pylon_economics::constants::{
    self, CORE_SYMBOL, ESCROW_PERIOD_SECS, MAX_GENESIS_CLAIMABLE, MIN_ACTIVATED_STAKE,
    RAM_SYMBOL, REFUND_DELAY_SECS,
};
use pylon_economics::{EconomyError, RamMarket, ResourceEconomy};

fn pyl(amount: i64) -> Asset {
    Asset::new(amount, CORE_SYMBOL)
}

fn setup() -> (ResourceEconomy, RecordingHost) {
    let market = RamMarket::new(pyl(1_000_000_0000), Asset::new(1 << 34, RAM_SYMBOL)).unwrap();
    let mut economy = ResourceEconomy::new(market);
    economy.set_market_open(true);
    economy.set_total_activated_stake(MIN_ACTIVATED_STAKE);
    (economy, RecordingHost::new())
}

fn alice() -> AccountName {
    AccountName::from("alice")
}

fn bob() -> AccountName {
    AccountName::from("bob")
}

#[test]
fn delegate_updates_row_totals_and_custody() {
    let (mut economy, mut host) = setup();

    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(100_0000), pyl(100_0000), false)
        .unwrap();

    let row = economy.ledger().delegation(&alice(), &bob()).unwrap();
    assert_eq!(row.net_weight, pyl(100_0000));
    assert_eq!(row.cpu_weight, pyl(100_0000));

    let totals = economy.ledger().totals(&bob()).unwrap();
    assert_eq!(totals.net_weight, pyl(100_0000));
    assert_eq!(totals.cpu_weight, pyl(100_0000));
    assert_eq!(totals.ram_bytes, 0);

    // trailing effects: limits for the receiver, tokens into custody
    assert_eq!(host.limits[&bob()], (0, 100_0000, 100_0000));
    assert_eq!(
        host.transferred(&alice(), &constants::stake_account()),
        200_0000
    );

    // the delegator's voting stake grew
    assert_eq!(economy.ledger().voter(&alice()).unwrap().staked, 200_0000);
}

#[test]
fn delegate_rejects_bad_quantities() {
    let (mut economy, mut host) = setup();

    assert_eq!(
        economy.delegatebw(&mut host, &alice(), &bob(), pyl(0), pyl(0), false),
        Err(EconomyError::NonPositiveStake)
    );
    assert_eq!(
        economy.delegatebw(&mut host, &alice(), &bob(), pyl(-1), pyl(2), false),
        Err(EconomyError::NonPositiveStake)
    );
    assert_eq!(
        economy.delegatebw(&mut host, &alice(), &alice(), pyl(1), pyl(1), true),
        Err(EconomyError::TransferToSelf)
    );
}

#[test]
fn undelegate_more_than_staked_fails_atomically() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(100_0000), pyl(100_0000), false)
        .unwrap();
    let snapshot = economy.ledger().clone();
    let transfers_before = host.transfers.len();

    let result = economy.undelegatebw(&mut host, &bob(), &alice(), pyl(150_0000), pyl(150_0000));
    assert_eq!(
        result,
        Err(EconomyError::InsufficientUnlockedStake {
            available: pyl(200_0000)
        })
    );
    assert_eq!(economy.ledger(), &snapshot);
    assert_eq!(host.transfers.len(), transfers_before);
}

#[test]
fn undelegate_moves_stake_into_refund_queue() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(100_0000), pyl(100_0000), false)
        .unwrap();

    economy
        .undelegatebw(&mut host, &bob(), &alice(), pyl(50_0000), pyl(50_0000))
        .unwrap();

    let totals = economy.ledger().totals(&bob()).unwrap();
    assert_eq!(totals.net_weight, pyl(50_0000));
    assert_eq!(totals.cpu_weight, pyl(50_0000));

    let refund = economy.ledger().refund(&alice()).unwrap();
    assert_eq!(refund.net_amount, pyl(50_0000));
    assert_eq!(refund.cpu_amount, pyl(50_0000));
    assert_eq!(refund.request_time, TimePointSec::from_secs(host.now));

    // a deferred payout is pending for the delegator
    assert_eq!(host.scheduled[&alice()], host.now + REFUND_DELAY_SECS);

    // no payout yet: custody has received but not returned anything
    assert_eq!(host.transferred(&constants::stake_account(), &alice()), 0);

    assert_eq!(economy.ledger().voter(&alice()).unwrap().staked, 100_0000);
}

#[test]
fn refund_pays_out_only_after_the_delay() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(100_0000), pyl(100_0000), false)
        .unwrap();
    economy
        .undelegatebw(&mut host, &bob(), &alice(), pyl(50_0000), pyl(50_0000))
        .unwrap();

    assert_eq!(
        economy.refund(&mut host, &alice()),
        Err(EconomyError::RefundNotDue)
    );

    host.advance(REFUND_DELAY_SECS);
    economy.refund(&mut host, &alice()).unwrap();

    assert_eq!(
        host.transferred(&constants::stake_account(), &alice()),
        100_0000
    );
    assert!(economy.ledger().refund(&alice()).is_none());

    // claiming twice finds nothing
    assert_eq!(
        economy.refund(&mut host, &alice()),
        Err(EconomyError::RefundNotFound(alice()))
    );
}

#[test]
fn restaking_draws_down_a_pending_refund_before_transferring() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(100_0000), pyl(100_0000), false)
        .unwrap();
    economy
        .undelegatebw(&mut host, &bob(), &alice(), pyl(50_0000), pyl(50_0000))
        .unwrap();
    let custody_before = host.transferred(&alice(), &constants::stake_account());

    // self-delegate 30 net: fully covered by the pending refund
    economy
        .delegatebw(&mut host, &alice(), &alice(), pyl(30_0000), pyl(0), false)
        .unwrap();

    let refund = economy.ledger().refund(&alice()).unwrap();
    assert_eq!(refund.net_amount, pyl(20_0000));
    assert_eq!(refund.cpu_amount, pyl(50_0000));

    // not a single token moved to custody for the restake
    assert_eq!(
        host.transferred(&alice(), &constants::stake_account()),
        custody_before
    );
}

#[test]
fn restaking_everything_clears_refund_and_deferred_task() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(100_0000), pyl(100_0000), false)
        .unwrap();
    economy
        .undelegatebw(&mut host, &bob(), &alice(), pyl(50_0000), pyl(50_0000))
        .unwrap();
    assert!(host.scheduled.contains_key(&alice()));

    economy
        .delegatebw(&mut host, &alice(), &alice(), pyl(50_0000), pyl(50_0000), false)
        .unwrap();

    assert!(economy.ledger().refund(&alice()).is_none());
    assert!(!host.scheduled.contains_key(&alice()));
}

#[test]
fn transfer_flag_hands_ownership_to_the_receiver() {
    let (mut economy, mut host) = setup();

    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(10_0000), pyl(10_0000), true)
        .unwrap();

    // the stake is recorded as bob's own self-delegation
    let row = economy.ledger().delegation(&bob(), &bob()).unwrap();
    assert_eq!(row.net_weight, pyl(10_0000));
    // but alice's tokens funded it
    assert_eq!(
        host.transferred(&alice(), &constants::stake_account()),
        20_0000
    );
    // and bob carries the voting stake
    assert_eq!(economy.ledger().voter(&bob()).unwrap().staked, 20_0000);

    // bob can now unstake it; refund lands with bob
    economy
        .undelegatebw(&mut host, &bob(), &bob(), pyl(10_0000), pyl(10_0000))
        .unwrap();
    assert!(economy.ledger().refund(&bob()).is_some());
}

#[test]
fn fully_unstaked_rows_disappear() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(1_0000), pyl(1_0000), false)
        .unwrap();
    economy
        .undelegatebw(&mut host, &bob(), &alice(), pyl(1_0000), pyl(1_0000))
        .unwrap();

    assert!(economy.ledger().delegation(&alice(), &bob()).is_none());
    assert!(economy.ledger().totals(&bob()).is_none());

    let refund = economy.ledger().refund(&alice()).unwrap();
    assert!(refund.net_amount.is_positive());
    assert!(refund.cpu_amount.is_positive());
}

#[test]
fn escrowed_stake_unlocks_per_period() {
    let (mut economy, mut host) = setup();

    // 120 locked over 4 periods: 30 per tranche, first tranche immediate
    economy
        .escrowbw(
            &mut host,
            &alice(),
            &alice(),
            pyl(60_0000),
            pyl(60_0000),
            false,
            4,
        )
        .unwrap();
    assert_eq!(economy.ledger().escrows(&alice()).len(), 1);

    let result = economy.undelegatebw(&mut host, &alice(), &alice(), pyl(60_0000), pyl(60_0000));
    assert_eq!(
        result,
        Err(EconomyError::InsufficientUnlockedStake {
            available: pyl(30_0000)
        })
    );
    // the failed attempt drew nothing from the bucket
    assert_eq!(economy.ledger().escrows(&alice())[0].amount, pyl(120_0000));

    // after two full periods three tranches are free
    host.advance(2 * ESCROW_PERIOD_SECS);
    economy
        .undelegatebw(&mut host, &alice(), &alice(), pyl(45_0000), pyl(45_0000))
        .unwrap();

    let bucket = &economy.ledger().escrows(&alice())[0];
    assert_eq!(bucket.amount, pyl(30_0000));
    assert_eq!(bucket.initial_amount, pyl(120_0000));

    let refund = economy.ledger().refund(&alice()).unwrap();
    assert_eq!(refund.net_amount, pyl(45_0000));
    assert_eq!(refund.cpu_amount, pyl(45_0000));
}

#[test]
fn escrow_needs_a_positive_period_count() {
    let (mut economy, mut host) = setup();
    assert_eq!(
        economy.escrowbw(&mut host, &alice(), &alice(), pyl(1), pyl(1), false, 0),
        Err(EconomyError::ZeroPeriodCount)
    );
}

#[test]
fn undelegation_waits_for_chain_activation() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(10_0000), pyl(10_0000), false)
        .unwrap();

    economy.set_total_activated_stake(MIN_ACTIVATED_STAKE - 1);
    assert_eq!(
        economy.undelegatebw(&mut host, &bob(), &alice(), pyl(1_0000), pyl(1_0000)),
        Err(EconomyError::ChainNotActivated)
    );
}

#[test]
fn undelegation_is_authorized_by_the_delegator() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(10_0000), pyl(10_0000), false)
        .unwrap();

    host.deny.insert(alice());
    assert_eq!(
        economy.undelegatebw(&mut host, &bob(), &alice(), pyl(1_0000), pyl(1_0000)),
        Err(EconomyError::MissingAuthority(alice()))
    );
}

#[test]
fn unknown_delegation_cannot_be_undelegated() {
    let (mut economy, mut host) = setup();
    assert_eq!(
        economy.undelegatebw(&mut host, &bob(), &alice(), pyl(1), pyl(1)),
        Err(EconomyError::UnknownDelegation {
            from: alice(),
            to: bob()
        })
    );
}

#[test]
fn changebw_rejects_opposite_sign_deltas() {
    let (mut economy, mut host) = setup();
    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(10_0000), pyl(10_0000), false)
        .unwrap();

    assert_eq!(
        economy.changebw(&mut host, &alice(), &bob(), pyl(5_0000), pyl(-3_0000), false),
        Err(EconomyError::OppositeSignDeltas)
    );
    assert_eq!(
        economy.changebw(&mut host, &alice(), &bob(), pyl(0), pyl(0), false),
        Err(EconomyError::ZeroStakeDelta)
    );
}

#[test]
fn genesis_stake_vests_linearly_over_ten_years() {
    let (mut economy, mut host) = setup();
    let founder = constants::genesis_vesting_account();
    let half = MAX_GENESIS_CLAIMABLE / 2;

    economy
        .delegatebw(&mut host, &founder, &founder, pyl(half), pyl(half), false)
        .unwrap();

    // nothing is claimable at launch
    assert_eq!(
        economy.undelegatebw(&mut host, &founder, &founder, pyl(1_0000), pyl(1_0000)),
        Err(EconomyError::GenesisVestingViolated)
    );

    // halfway through the horizon, half the allocation is claimable
    host.advance(5 * constants::SECONDS_PER_YEAR);
    economy
        .undelegatebw(&mut host, &founder, &founder, pyl(half / 2), pyl(half / 2))
        .unwrap();
    assert_eq!(
        economy.ledger().voter(&founder).unwrap().staked,
        MAX_GENESIS_CLAIMABLE / 2
    );
}

#[test]
fn stake_changes_propagate_to_active_voters() {
    let (mut economy, mut host) = setup();
    economy.set_voter_info(&alice(), Some(AccountName::from("proxy.one")), Vec::new());

    economy
        .delegatebw(&mut host, &alice(), &bob(), pyl(10_0000), pyl(10_0000), false)
        .unwrap();
    assert_eq!(host.vote_updates, vec![alice()]);

    // bob has neither proxy nor producers: no propagation
    economy
        .delegatebw(&mut host, &bob(), &alice(), pyl(10_0000), pyl(10_0000), false)
        .unwrap();
    assert_eq!(host.vote_updates, vec![alice()]);
}
