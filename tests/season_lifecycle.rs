//! End-to-end season lifecycle through the public API.
//!
//! Drives a registry and its ledgers the way an external caller would:
//! create, admit, pay in, allocate, withdraw, tip, complete.

use std::sync::Arc;
use std::thread;

use season_escrow::{AccountId, Amount, EscrowError, Registry};

const COIN: Amount = 1_000_000;

fn id(seed: &str) -> AccountId {
    AccountId::from_seed(seed)
}

fn registry() -> Registry {
    Registry::with_denomination(id("registry"), COIN)
}

#[test]
fn full_season_settles_and_deregisters() {
    let registry = registry();
    let a = id("A");
    let b = id("B");

    let season = registry.create_ledger(&a, 100).unwrap();
    assert_eq!(registry.get_sequence_counter(), 1);
    assert_eq!(registry.get_stake(&a, 0), Ok(100));

    season.deposit_stake(&a, 100, 100).unwrap();
    assert_eq!(season.pool_balance(), 100);

    season.admit(&a, &b).unwrap();
    assert_eq!(
        season.allocate_winnings(&a, &b, 60),
        Err(EscrowError::StakeNotPaid { account: b })
    );

    season.deposit_stake(&b, 100, 100).unwrap();
    assert_eq!(season.pool_balance(), 200);

    season.allocate_winnings(&a, &b, 60).unwrap();
    assert_eq!(season.pool_balance(), 140);
    assert_eq!(season.pending_winnings(&b), 60);

    assert_eq!(season.withdraw(&b), Ok(60));
    assert_eq!(season.pending_winnings(&b), 0);
    assert_eq!(season.held_funds(), 140);

    season.allocate_winnings(&a, &a, 140).unwrap();
    assert_eq!(season.pool_balance(), 0);

    assert_eq!(season.withdraw(&a), Ok(140));
    assert_eq!(season.held_funds(), 0);

    season.complete(&a).unwrap();
    assert!(season.is_complete());
    assert!(matches!(
        registry.lookup_ledger(&a, 0),
        Err(EscrowError::NotFound { .. })
    ));
    assert_eq!(season.complete(&a), Err(EscrowError::AlreadyComplete));

    let treasury = registry.treasury();
    assert_eq!(treasury.received(&a), 140);
    assert_eq!(treasury.received(&b), 60);

    let kinds: Vec<&str> = registry
        .journal()
        .records()
        .iter()
        .map(|r| r.event.name())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "season_started",
            "admitted",
            "ledger_created",
            "stake_paid",
            "admitted",
            "stake_paid",
            "winnings_allocated",
            "withdrawal",
            "winnings_allocated",
            "withdrawal",
            "season_completed",
            "ledger_removed",
        ]
    );
}

#[test]
fn tip_below_threshold_never_reaches_owner() {
    let registry = registry();
    let owner = id("owner");
    let fan = id("fan");
    let season = registry.create_ledger(&owner, 100).unwrap();
    season.admit(&owner, &fan).unwrap();

    assert_eq!(
        season.tip_owner(&fan, 1),
        Err(EscrowError::TipTooSmall {
            amount: 1,
            minimum: 1_000
        })
    );
    assert_eq!(
        season.tip_owner(&fan, 999),
        Err(EscrowError::TipTooSmall {
            amount: 999,
            minimum: 1_000
        })
    );
    assert_eq!(registry.treasury().received(&owner), 0);

    season.tip_owner(&fan, 2_500).unwrap();
    assert_eq!(registry.treasury().received(&owner), 2_500);
    assert_eq!(season.held_funds(), 0);
}

#[test]
fn deregistration_is_a_capability_of_the_ledger_alone() {
    let registry = registry();
    let owner = id("owner");
    let season = registry.create_ledger(&owner, 100).unwrap();

    assert!(matches!(
        registry.remove_ledger(&owner, &owner, season.sequence_id()),
        Err(EscrowError::MustBeCalledByLedger { .. })
    ));
    assert!(registry.lookup_ledger(&owner, season.sequence_id()).is_ok());
}

#[test]
fn cross_identity_lookups_fail_for_valid_ids() {
    let registry = registry();
    let alice = id("alice");
    let mallory = id("mallory");
    for _ in 0..3 {
        registry.create_ledger(&alice, 10).unwrap();
    }
    for sequence_id in 0..registry.get_sequence_counter() {
        assert!(registry.lookup_ledger(&alice, sequence_id).is_ok());
        assert_eq!(
            registry.lookup_ledger(&mallory, sequence_id).unwrap_err(),
            EscrowError::NotFound {
                owner: mallory,
                sequence_id
            }
        );
    }
}

#[test]
fn concurrent_deposits_are_serialized_per_ledger() {
    let registry = registry();
    let owner = id("owner");
    let season = registry.create_ledger(&owner, 7).unwrap();

    let players: Vec<AccountId> = (0..16).map(|i| id(&format!("player-{}", i))).collect();
    for player in &players {
        season.admit(&owner, player).unwrap();
    }

    let handles: Vec<_> = players
        .iter()
        .map(|player| {
            let season = Arc::clone(&season);
            let player = *player;
            thread::spawn(move || {
                // Every player races two deposits; exactly one may land.
                let first = season.deposit_stake(&player, 7, 7);
                let second = season.deposit_stake(&player, 7, 7);
                (first.is_ok() as u32) + (second.is_ok() as u32)
            })
        })
        .collect();

    let landed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(landed, 16);
    assert_eq!(season.pool_balance(), 16 * 7);
    assert_eq!(season.held_funds(), 16 * 7);
    assert!(season.custody().is_conserved());
}

#[test]
fn custody_is_conserved_through_a_busy_season() {
    let registry = registry();
    let owner = id("owner");
    let season = registry.create_ledger(&owner, 50).unwrap();
    let players: Vec<AccountId> = (0..5).map(|i| id(&format!("p{}", i))).collect();

    for player in &players {
        season.admit(&owner, player).unwrap();
        season.deposit_stake(player, 50, 50).unwrap();
        assert!(season.custody().is_conserved());
    }
    // 30 + 40 + 50 + 60 + 70 drains the 250 pool exactly.
    for (i, player) in players.iter().enumerate() {
        season
            .allocate_winnings(&owner, player, 30 + i as Amount * 10)
            .unwrap();
        assert!(season.custody().is_conserved());
    }
    assert_eq!(season.pool_balance(), 0);

    for (i, player) in players.iter().enumerate() {
        assert_eq!(season.withdraw(player), Ok(30 + i as Amount * 10));
        let report = season.custody();
        assert!(report.is_conserved());
        assert_eq!(report.pool_balance + report.pending_total, report.held_funds);
    }
    assert_eq!(season.pool_balance(), 0);
    assert_eq!(season.held_funds(), 0);
    season.complete(&owner).unwrap();
}
