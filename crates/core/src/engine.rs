// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Keyed winner selection.
//!
//! Each attempt computes `HMAC-SHA256(seed, "pick-<winners>-<attempt>")`,
//! reads the digest as a big-endian integer and reduces it modulo the
//! snapshot length. An index is accepted only if it has not been used and
//! its ticket number is not already a winner; otherwise the attempt counter
//! moves on. Output depends only on `(seed, snapshot, k)`.

use std::collections::BTreeSet;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use ticket_draw_audit::{DrawResultEntry, SnapshotEntry};
use ticket_draw_domain::TicketNumber;
use tracing::{debug, warn};

use crate::error::DrawError;
use crate::seed::Seed;

/// Identifier stored with every record produced by this module.
pub const ALGORITHM: &str = "hmac-sha256-v1";

/// Attempts allowed per requested winner before giving up.
pub const DEFAULT_ATTEMPT_MULTIPLIER: u32 = 100;

type HmacSha256 = Hmac<Sha256>;

/// The outcome of one selection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSelection {
    /// Winners in selection order.
    pub winners: Vec<SnapshotEntry>,
    pub requested: u32,
    /// Attempts consumed.
    pub attempts: u64,
}

impl DrawSelection {
    /// Fewer unique winners were found than requested within the bound.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.winners.len() < self.requested as usize
    }

    /// Result entries numbered from position 1.
    #[must_use]
    pub fn to_results(&self) -> Vec<DrawResultEntry> {
        self.winners
            .iter()
            .zip(1_u32..)
            .map(|(entry, position)| DrawResultEntry::from_snapshot(position, entry))
            .collect()
    }
}

/// Picks `k` winners with the default attempt bound.
///
/// # Errors
///
/// See [`pick_winners_bounded`].
pub fn pick_winners(
    seed: &Seed,
    snapshot: &[SnapshotEntry],
    k: u32,
) -> Result<Vec<SnapshotEntry>, DrawError> {
    pick_winners_bounded(seed, snapshot, k, DEFAULT_ATTEMPT_MULTIPLIER).map(|s| s.winners)
}

/// Picks up to `k` winners, trying at most `attempt_multiplier × k` times.
///
/// A partial selection is returned, not an error, when the bound is hit.
///
/// # Errors
///
/// Returns an error if:
/// - `k` is zero (`InvalidWinnerCount`)
/// - The snapshot is empty (`EmptySnapshot`)
/// - `k` exceeds the snapshot size (`OversizedRequest`)
pub fn pick_winners_bounded(
    seed: &Seed,
    snapshot: &[SnapshotEntry],
    k: u32,
    attempt_multiplier: u32,
) -> Result<DrawSelection, DrawError> {
    if k == 0 {
        return Err(DrawError::InvalidWinnerCount);
    }
    if snapshot.is_empty() {
        return Err(DrawError::EmptySnapshot);
    }
    let available = u32::try_from(snapshot.len()).unwrap_or(u32::MAX);
    if k > available {
        return Err(DrawError::OversizedRequest {
            requested: k,
            available,
        });
    }

    let wanted = k as usize;
    let max_attempts: u64 = u64::from(k) * u64::from(attempt_multiplier.max(1));
    let mut used_indices: Vec<bool> = vec![false; snapshot.len()];
    let mut winning_numbers: BTreeSet<TicketNumber> = BTreeSet::new();
    let mut winners: Vec<SnapshotEntry> = Vec::with_capacity(wanted);
    let mut attempt: u64 = 0;

    while winners.len() < wanted && attempt < max_attempts {
        let index = candidate_index(seed, winners.len(), attempt, snapshot.len())?;
        attempt += 1;

        if used_indices[index] {
            continue;
        }
        let candidate = &snapshot[index];
        if winning_numbers.contains(&candidate.ticket_number) {
            continue;
        }

        used_indices[index] = true;
        winning_numbers.insert(candidate.ticket_number);
        winners.push(candidate.clone());
    }

    let selection = DrawSelection {
        winners,
        requested: k,
        attempts: attempt,
    };

    if selection.is_partial() {
        warn!(
            requested = k,
            found = selection.winners.len(),
            attempts = attempt,
            "Attempt bound reached before all winners were selected"
        );
    } else {
        debug!(requested = k, attempts = attempt, "Winner selection complete");
    }

    Ok(selection)
}

fn candidate_index(
    seed: &Seed,
    winners_so_far: usize,
    attempt: u64,
    modulus: usize,
) -> Result<usize, DrawError> {
    let mut mac = HmacSha256::new_from_slice(seed.as_bytes())
        .map_err(|e| DrawError::InvalidSeed(e.to_string()))?;
    mac.update(format!("pick-{winners_so_far}-{attempt}").as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(reduce_digest(&digest, modulus))
}

/// Reduces a big-endian byte string modulo `modulus`.
fn reduce_digest(digest: &[u8], modulus: usize) -> usize {
    let m = modulus as u128;
    let remainder = digest
        .iter()
        .fold(0_u128, |acc, byte| ((acc << 8) | u128::from(*byte)) % m);
    // remainder < modulus, so it always fits
    usize::try_from(remainder).unwrap_or(0)
}

/// SHA-256 over the canonical text form of a snapshot, hex-encoded.
///
/// Stored next to the snapshot so that editing any entry, winner or not,
/// is detected on replay.
#[must_use]
pub fn snapshot_digest(snapshot: &[SnapshotEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in snapshot {
        let owner = entry
            .owner_id
            .map_or_else(|| String::from("-"), |id| id.to_string());
        hasher.update(format!("{}:{}:{owner}\n", entry.ticket_id, entry.ticket_number).as_bytes());
    }
    hex::encode(hasher.finalize())
}
