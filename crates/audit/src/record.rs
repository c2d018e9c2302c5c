// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ticket_draw_domain::{DrawMethod, TicketNumber};

use crate::error::AuditError;

/// One eligible ticket as captured at draw time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub ticket_id: i64,
    pub ticket_number: TicketNumber,
    pub owner_id: Option<i64>,
}

/// One selected ticket, in draw order.
///
/// Position 1 is the first primary winner; positions beyond the
/// competition's primary count are reserves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResultEntry {
    pub position: u32,
    pub ticket_id: i64,
    pub ticket_number: TicketNumber,
    pub owner_id: Option<i64>,
}

impl DrawResultEntry {
    /// Builds a result entry from the snapshot entry it was picked from.
    #[must_use]
    pub const fn from_snapshot(position: u32, entry: &SnapshotEntry) -> Self {
        Self {
            position,
            ticket_id: entry.ticket_id,
            ticket_number: entry.ticket_number,
            owner_id: entry.owner_id,
        }
    }
}

/// The administrator (or process) that started a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "admin", "scheduler").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Why a draw produced no winners.
///
/// The variants never expose snapshot contents; `user_message` is safe to
/// show to buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DrawFailure {
    /// The snapshot held zero eligible tickets.
    NoEligibleTickets,
    /// More winners were requested than tickets were eligible.
    NotEnoughEligibleTickets { requested: u32, available: u32 },
}

impl DrawFailure {
    /// Stable identifier stored with the record.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoEligibleTickets => "no_eligible_tickets",
            Self::NotEnoughEligibleTickets { .. } => "not_enough_eligible_tickets",
        }
    }

    /// Audit note written into the record.
    #[must_use]
    pub fn audit_note(&self) -> String {
        match self {
            Self::NoEligibleTickets => {
                String::from("Draw produced no winners: zero eligible tickets at draw time")
            }
            Self::NotEnoughEligibleTickets {
                requested,
                available,
            } => format!(
                "Draw produced no winners: {requested} winners requested but only {available} eligible tickets"
            ),
        }
    }

    /// Generic wording for buyers and the public results page.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NoEligibleTickets | Self::NotEnoughEligibleTickets { .. } => {
                "No eligible entries were available for this draw"
            }
        }
    }
}

/// A draw record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrawRecord {
    pub competition_id: i64,
    pub seed_hex: String,
    pub algorithm: String,
    pub snapshot: Vec<SnapshotEntry>,
    /// SHA-256 of the snapshot's canonical form.
    pub snapshot_digest: String,
    pub results: Vec<DrawResultEntry>,
    pub requested_winners: u32,
    pub method: DrawMethod,
    pub initiated_by: Option<Actor>,
    pub notes: Option<String>,
    pub evidence_url: Option<String>,
    pub failure: Option<DrawFailure>,
}

impl NewDrawRecord {
    /// Checks the internal consistency of the record before it is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The snapshot is not strictly ascending by ticket number
    /// - A winner is missing from the snapshot or listed twice
    /// - Positions do not run `1..=n`
    /// - A failure record carries winners
    /// - More winners are listed than were requested
    pub fn validate(&self) -> Result<(), AuditError> {
        let mut previous: Option<TicketNumber> = None;
        for (position, entry) in self.snapshot.iter().enumerate() {
            if let Some(prev) = previous {
                if prev == entry.ticket_number {
                    return Err(AuditError::DuplicateSnapshotEntry(entry.ticket_number));
                }
                if prev > entry.ticket_number {
                    return Err(AuditError::UnorderedSnapshot { position });
                }
            }
            previous = Some(entry.ticket_number);
        }

        if self.failure.is_some() && !self.results.is_empty() {
            return Err(AuditError::FailureWithWinners);
        }

        if self.results.len() > self.requested_winners as usize {
            return Err(AuditError::TooManyWinners {
                requested: self.requested_winners,
                found: self.results.len(),
            });
        }

        let eligible: BTreeSet<(i64, TicketNumber)> = self
            .snapshot
            .iter()
            .map(|e| (e.ticket_id, e.ticket_number))
            .collect();
        let mut seen: BTreeSet<TicketNumber> = BTreeSet::new();
        for (index, result) in self.results.iter().enumerate() {
            if !eligible.contains(&(result.ticket_id, result.ticket_number)) {
                return Err(AuditError::WinnerNotInSnapshot(result.ticket_number));
            }
            if !seen.insert(result.ticket_number) {
                return Err(AuditError::DuplicateWinner(result.ticket_number));
            }
            let expected = u32::try_from(index + 1).unwrap_or(u32::MAX);
            if result.position != expected {
                return Err(AuditError::InvalidPosition {
                    index,
                    found: result.position,
                });
            }
        }

        Ok(())
    }
}

/// A stored, immutable draw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub draw_id: i64,
    pub competition_id: i64,
    /// RFC 3339 timestamp of the draw.
    pub drawn_at: String,
    pub seed_hex: String,
    pub algorithm: String,
    /// `None` for records written before snapshots were persisted.
    pub snapshot: Option<Vec<SnapshotEntry>>,
    pub snapshot_count: u32,
    pub snapshot_digest: Option<String>,
    pub results: Vec<DrawResultEntry>,
    pub requested_winners: u32,
    pub method: DrawMethod,
    pub initiated_by: Option<Actor>,
    pub notes: Option<String>,
    pub evidence_url: Option<String>,
    pub failure_reason: Option<String>,
}

impl DrawRecord {
    /// Whether the draw selected at least one winner.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        !self.results.is_empty()
    }

    /// The winning ticket numbers, in draw order.
    #[must_use]
    pub fn winning_numbers(&self) -> Vec<TicketNumber> {
        self.results.iter().map(|r| r.ticket_number).collect()
    }
}
