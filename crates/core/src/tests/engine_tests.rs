// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

use super::helpers::{ab_seed, snapshot_of};
use crate::{DrawError, generate_seed, pick_winners, pick_winners_bounded, snapshot_digest};

#[test]
fn test_single_winner_example_is_stable() {
    let seed = ab_seed();
    let snapshot = snapshot_of(&[5, 12, 19, 42]);

    let first = pick_winners(&seed, &snapshot, 1).expect("draw succeeds");
    let second = pick_winners(&seed, &snapshot, 1).expect("draw succeeds");

    assert_eq!(first.len(), 1);
    assert!([5, 12, 19, 42].contains(&first[0].ticket_number.value()));
    assert_eq!(first, second);
}

#[test]
fn test_same_inputs_same_ordered_output() {
    let seed = generate_seed();
    let snapshot = snapshot_of(&(1..=200).collect::<Vec<i64>>());

    let first = pick_winners(&seed, &snapshot, 10).expect("draw succeeds");
    for _ in 0..5 {
        assert_eq!(pick_winners(&seed, &snapshot, 10).expect("draw succeeds"), first);
    }
}

#[test]
fn test_winners_are_unique_members_of_snapshot() {
    let snapshot = snapshot_of(&(1..=50).map(|n| n * 3).collect::<Vec<i64>>());
    let eligible: BTreeSet<u32> = snapshot.iter().map(|e| e.ticket_number.value()).collect();

    for _ in 0..20 {
        let winners = pick_winners(&generate_seed(), &snapshot, 12).expect("draw succeeds");
        let numbers: BTreeSet<u32> = winners.iter().map(|w| w.ticket_number.value()).collect();
        assert_eq!(numbers.len(), 12, "no duplicate winners");
        assert!(numbers.is_subset(&eligible));
    }
}

#[test]
fn test_drawing_every_ticket_returns_whole_snapshot() {
    let snapshot = snapshot_of(&[2, 4, 6, 8, 10]);
    let winners = pick_winners(&ab_seed(), &snapshot, 5).expect("draw succeeds");
    let mut numbers: Vec<u32> = winners.iter().map(|w| w.ticket_number.value()).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![2, 4, 6, 8, 10]);
}

#[test]
fn test_different_seeds_usually_differ() {
    let snapshot = snapshot_of(&(1..=1_000).collect::<Vec<i64>>());
    let a = pick_winners(&generate_seed(), &snapshot, 5).expect("draw succeeds");
    let b = pick_winners(&generate_seed(), &snapshot, 5).expect("draw succeeds");
    assert_ne!(a, b);
}

#[test]
fn test_empty_snapshot_rejected() {
    assert_eq!(
        pick_winners(&ab_seed(), &[], 1),
        Err(DrawError::EmptySnapshot)
    );
}

#[test]
fn test_oversized_request_rejected() {
    let snapshot = snapshot_of(&[1, 2, 3]);
    assert_eq!(
        pick_winners(&ab_seed(), &snapshot, 4),
        Err(DrawError::OversizedRequest {
            requested: 4,
            available: 3
        })
    );
}

#[test]
fn test_zero_winners_rejected() {
    let snapshot = snapshot_of(&[1]);
    assert_eq!(
        pick_winners(&ab_seed(), &snapshot, 0),
        Err(DrawError::InvalidWinnerCount)
    );
}

#[test]
fn test_attempt_bound_yields_partial_selection() {
    // Two rows sharing one number can only ever yield one winner.
    let mut snapshot = snapshot_of(&[7, 8]);
    snapshot[1].ticket_number = snapshot[0].ticket_number;

    let selection = pick_winners_bounded(&ab_seed(), &snapshot, 2, 100).expect("no error");
    assert!(selection.is_partial());
    assert_eq!(selection.winners.len(), 1);
    assert_eq!(selection.attempts, 200);
}

#[test]
fn test_results_are_numbered_from_one() {
    let snapshot = snapshot_of(&[5, 12, 19, 42]);
    let selection = pick_winners_bounded(&ab_seed(), &snapshot, 3, 100).expect("draw succeeds");
    let positions: Vec<u32> = selection.to_results().iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[test]
fn test_snapshot_digest_detects_any_change() {
    let snapshot = snapshot_of(&[5, 12, 19, 42]);
    let original = snapshot_digest(&snapshot);

    let mut changed = snapshot.clone();
    changed[3].owner_id = None;
    assert_ne!(snapshot_digest(&changed), original);
    assert_eq!(snapshot_digest(&snapshot), original);
}
