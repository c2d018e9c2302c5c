// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Replay of stored draw records.

use std::collections::BTreeMap;

use ticket_draw_audit::DrawRecord;
use ticket_draw_domain::TicketNumber;
use tracing::{debug, warn};

use crate::engine::{ALGORITHM, pick_winners_bounded, snapshot_digest};
use crate::error::DrawError;
use crate::seed::Seed;

/// Result of replaying a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub draw_id: i64,
    pub matches: bool,
    pub recorded: Vec<TicketNumber>,
    pub replayed: Vec<TicketNumber>,
}

/// Re-runs selection over a record's stored seed and snapshot.
///
/// The record matches when the replayed winner numbers equal the stored
/// ones as a multiset (order is ignored), the stored snapshot still hashes
/// to its stored digest and its length equals the stored count. A failure
/// record (no winners) matches when the replay fails the same precondition.
///
/// # Errors
///
/// Returns an error if:
/// - The record has no stored snapshot (`MissingSnapshot`)
/// - The record names an algorithm this build does not implement
/// - The stored seed cannot be parsed
pub fn replay_record(
    record: &DrawRecord,
    attempt_multiplier: u32,
) -> Result<ReplayOutcome, DrawError> {
    let snapshot = record.snapshot.as_ref().ok_or(DrawError::MissingSnapshot)?;
    if record.algorithm != ALGORITHM {
        return Err(DrawError::UnsupportedAlgorithm(record.algorithm.clone()));
    }
    let seed = Seed::from_hex(&record.seed_hex)?;
    let recorded = record.winning_numbers();

    let mut outcome = ReplayOutcome {
        draw_id: record.draw_id,
        matches: false,
        recorded,
        replayed: Vec::new(),
    };

    if snapshot.len() != record.snapshot_count as usize {
        warn!(
            draw_id = record.draw_id,
            stored = record.snapshot_count,
            actual = snapshot.len(),
            "Snapshot length differs from recorded count"
        );
        return Ok(outcome);
    }

    if let Some(expected) = &record.snapshot_digest
        && *expected != snapshot_digest(snapshot)
    {
        warn!(draw_id = record.draw_id, "Snapshot digest mismatch");
        return Ok(outcome);
    }

    let k = if record.requested_winners > 0 {
        record.requested_winners
    } else {
        u32::try_from(record.results.len()).unwrap_or(u32::MAX)
    };

    match pick_winners_bounded(&seed, snapshot, k, attempt_multiplier) {
        Ok(selection) => {
            outcome.replayed = selection.winners.iter().map(|w| w.ticket_number).collect();
            outcome.matches = same_members(&outcome.recorded, &outcome.replayed);
        }
        Err(err) if err.is_precondition_failure() || err == DrawError::InvalidWinnerCount => {
            outcome.matches = outcome.recorded.is_empty();
        }
        Err(err) => return Err(err),
    }

    if outcome.matches {
        debug!(draw_id = record.draw_id, "Draw replay matches record");
    } else {
        warn!(
            draw_id = record.draw_id,
            recorded = ?outcome.recorded,
            replayed = ?outcome.replayed,
            "Draw replay does not match record"
        );
    }

    Ok(outcome)
}

/// Order-independent comparison including multiplicity.
fn same_members(a: &[TicketNumber], b: &[TicketNumber]) -> bool {
    fn counts(items: &[TicketNumber]) -> BTreeMap<TicketNumber, usize> {
        let mut map = BTreeMap::new();
        for item in items {
            *map.entry(*item).or_insert(0) += 1;
        }
        map
    }
    a.len() == b.len() && counts(a) == counts(b)
}
