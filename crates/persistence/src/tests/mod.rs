// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod backend_validation_tests;
mod transaction_tests;

use ticket_draw::{ALGORITHM, snapshot_digest};
use ticket_draw_audit::{DrawResultEntry, NewDrawRecord, SnapshotEntry};
use ticket_draw_domain::{DrawMethod, DrawMode, TicketNumber};

use crate::{NewCompetition, Persistence};

/// Fixed clock reading used across ledger tests.
pub const NOW: i64 = 1_700_000_000;

/// Reservation hold used across ledger tests.
pub const TTL: i64 = 900;

pub fn n(value: i64) -> TicketNumber {
    TicketNumber::new(value).unwrap()
}

pub fn numbers(values: &[i64]) -> Vec<TicketNumber> {
    values.iter().map(|&v| n(v)).collect()
}

pub fn new_competition(ticket_limit: Option<u32>) -> NewCompetition {
    NewCompetition {
        title: String::from("Test Raffle"),
        ticket_limit,
        draw_at: NOW + 3_600,
        draw_mode: DrawMode::Automatic,
        winner_count: 1,
        reserve_count: 1,
    }
}

/// Creates a competition and returns its ID.
pub fn create_competition(persistence: &mut Persistence, ticket_limit: Option<u32>) -> i64 {
    persistence
        .create_competition(&new_competition(ticket_limit), NOW)
        .unwrap()
}

/// Reserves and pays for `values` as one order, leaving them `active`.
pub fn sell(
    persistence: &mut Persistence,
    competition_id: i64,
    owner_id: i64,
    order_id: i64,
    values: &[i64],
) {
    let picked = numbers(values);
    persistence
        .allocate_tickets(competition_id, &picked, owner_id, NOW, NOW + TTL)
        .unwrap();
    persistence
        .attach_order(competition_id, owner_id, &picked, order_id, NOW + TTL, NOW)
        .unwrap();
    persistence.confirm_order_payment(order_id).unwrap();
}

/// Builds a draw record naming the first `winners` snapshot entries.
pub fn draw_record(
    competition_id: i64,
    snapshot: Vec<SnapshotEntry>,
    winners: usize,
    requested: u32,
) -> NewDrawRecord {
    let results: Vec<DrawResultEntry> = snapshot
        .iter()
        .take(winners)
        .enumerate()
        .map(|(i, entry)| DrawResultEntry::from_snapshot(u32::try_from(i + 1).unwrap(), entry))
        .collect();
    NewDrawRecord {
        competition_id,
        seed_hex: "ab".repeat(32),
        algorithm: ALGORITHM.to_string(),
        snapshot_digest: snapshot_digest(&snapshot),
        snapshot,
        results,
        requested_winners: requested,
        method: DrawMethod::AdminTriggered,
        initiated_by: None,
        notes: None,
        evidence_url: None,
        failure: None,
    }
}
