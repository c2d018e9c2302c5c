// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{NOW, TTL, create_competition, draw_record, numbers, sell};
use crate::{PersistenceError, SqlitePersistence, TransactionMode};
use ticket_draw_domain::{CompetitionStatus, TicketState};

#[test]
fn test_sqlite_defaults_to_atomic_mode() {
    let persistence = SqlitePersistence::new_in_memory().unwrap();
    assert_eq!(persistence.transaction_mode(), TransactionMode::Atomic);
}

#[test]
fn test_atomic_allocation_inserts_nothing_on_conflict() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let competition_id = create_competition(&mut persistence, Some(10));
    persistence
        .allocate_tickets(competition_id, &numbers(&[3]), 1, NOW, NOW + TTL)
        .unwrap();

    let err = persistence
        .allocate_tickets(competition_id, &numbers(&[1, 2, 3]), 2, NOW, NOW + TTL)
        .unwrap_err();
    assert!(matches!(err, PersistenceError::TicketConflict { .. }));

    let taken: Vec<i64> = persistence
        .taken_numbers(competition_id, NOW)
        .unwrap()
        .into_iter()
        .map(|n| n.as_i64())
        .collect();
    assert_eq!(taken, vec![3]);
}

#[test]
fn test_sequential_mode_applies_the_same_writes() {
    let mut persistence = SqlitePersistence::new_in_memory()
        .unwrap()
        .with_transaction_mode(TransactionMode::Sequential);
    assert_eq!(persistence.transaction_mode(), TransactionMode::Sequential);

    let competition_id = create_competition(&mut persistence, Some(10));
    sell(&mut persistence, competition_id, 1, 10, &[4, 8]);
    persistence.claim_for_draw(competition_id).unwrap();

    let snapshot = persistence.snapshot_active_tickets(competition_id).unwrap();
    let stored = persistence
        .record_draw(
            &draw_record(competition_id, snapshot, 1, 1),
            1,
            "2023-11-14T22:13:20Z",
            NOW,
        )
        .unwrap();

    assert_eq!(persistence.list_winners(stored.draw_id).unwrap().len(), 1);
    assert_eq!(
        persistence.get_competition(competition_id).unwrap().status,
        CompetitionStatus::Drawn
    );
    assert_eq!(
        persistence.get_competition(competition_id).unwrap().tickets_sold,
        2
    );
}

#[test]
fn test_sequential_mode_keeps_earlier_steps_after_failure() {
    let mut persistence = SqlitePersistence::new_in_memory()
        .unwrap()
        .with_transaction_mode(TransactionMode::Sequential);
    let competition_id = create_competition(&mut persistence, Some(10));
    sell(&mut persistence, competition_id, 1, 10, &[1]);
    sell(&mut persistence, competition_id, 2, 20, &[2]);

    let snapshot = persistence.snapshot_active_tickets(competition_id).unwrap();
    let record = draw_record(competition_id, snapshot, 2, 2);
    persistence.refund_order_tickets(20).unwrap();

    let err = persistence
        .record_draw(&record, 2, "2023-11-14T22:13:20Z", NOW)
        .unwrap_err();
    assert!(matches!(err, PersistenceError::TicketNotEligible { .. }));

    // Without a transaction the record row and first promotion remain
    assert_eq!(persistence.list_draws(competition_id).unwrap().len(), 1);
    assert_eq!(
        persistence
            .get_ticket(record.results[0].ticket_id)
            .unwrap()
            .state,
        TicketState::Winner
    );
}
