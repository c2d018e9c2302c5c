// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ticket_draw_audit::{DrawRecord, SnapshotEntry};
use ticket_draw_domain::{DrawMethod, TicketNumber};

use crate::{ALGORITHM, DrawSelection, Seed, snapshot_digest};

/// The 32-byte `0xAB…` seed used across examples.
pub fn ab_seed() -> Seed {
    Seed::from_bytes(vec![0xAB; 32]).expect("valid seed")
}

pub fn snapshot_of(numbers: &[i64]) -> Vec<SnapshotEntry> {
    numbers
        .iter()
        .enumerate()
        .map(|(i, n)| SnapshotEntry {
            ticket_id: i64::try_from(i).expect("small index") + 100,
            ticket_number: TicketNumber::new(*n).expect("valid number"),
            owner_id: Some(*n * 7),
        })
        .collect()
}

pub fn record_from(
    seed: &Seed,
    snapshot: Vec<SnapshotEntry>,
    selection: &DrawSelection,
) -> DrawRecord {
    DrawRecord {
        draw_id: 1,
        competition_id: 1,
        drawn_at: String::from("2026-10-18T12:00:00Z"),
        seed_hex: seed.to_hex(),
        algorithm: ALGORITHM.to_string(),
        snapshot_count: u32::try_from(snapshot.len()).expect("small snapshot"),
        snapshot_digest: Some(snapshot_digest(&snapshot)),
        snapshot: Some(snapshot),
        results: selection.to_results(),
        requested_winners: selection.requested,
        method: DrawMethod::Automatic,
        initiated_by: None,
        notes: None,
        evidence_url: None,
        failure_reason: None,
    }
}
