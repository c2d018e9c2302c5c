// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response data transfer objects.

use serde::{Deserialize, Serialize};
use ticket_draw_audit::{DrawRecord, DrawResultEntry, SnapshotEntry, WinnerRecord};
use ticket_draw_domain::{DrawMethod, TicketNumber, TicketSelection};

/// Request to hold tickets for a buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldTicketsRequest {
    /// The competition to enter.
    pub competition_id: i64,
    /// The buyer.
    pub owner_id: i64,
    /// Lucky draw or picked numbers.
    pub selection: TicketSelection,
}

/// Numbers held by a successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldTicketsResponse {
    pub competition_id: i64,
    /// Held numbers, ascending.
    pub numbers: Vec<TicketNumber>,
    /// Unix seconds at which the hold lapses.
    pub expires_at: i64,
}

/// Request to bind held numbers to a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOrderRequest {
    pub competition_id: i64,
    pub owner_id: i64,
    pub numbers: Vec<TicketNumber>,
    pub order_id: i64,
}

/// Rows removed by one reservation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SweepReport {
    /// Reservations past their own expiry.
    pub expired: usize,
    /// Reservations older than the safety-net age.
    pub stale: usize,
}

impl SweepReport {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.expired + self.stale
    }
}

/// A winner selection that has not been recorded.
///
/// Produced by `DrawService::run_draw`; pass it to
/// `DrawService::create_draw_record` to store it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRun {
    pub competition_id: i64,
    /// Hex-encoded seed.
    pub seed_hex: String,
    /// Eligible tickets, ascending by number.
    pub snapshot: Vec<SnapshotEntry>,
    /// Winners numbered from position 1.
    pub results: Vec<DrawResultEntry>,
    /// Winners asked for.
    pub requested_winners: u32,
}

impl DrawRun {
    /// Fewer winners were found than requested.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.results.len() < self.requested_winners as usize
    }
}

/// Request to store a draw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDrawRecordRequest {
    pub competition_id: i64,
    pub seed_hex: String,
    pub results: Vec<DrawResultEntry>,
    pub snapshot: Vec<SnapshotEntry>,
    pub requested_winners: u32,
    pub method: DrawMethod,
    pub notes: Option<String>,
    pub evidence_url: Option<String>,
}

/// Outcome of one executed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    /// The stored record.
    pub record: DrawRecord,
    /// Winner rows created for the record, by position.
    pub winners: Vec<WinnerRecord>,
    /// Fewer winners were found than requested, reserves included.
    pub partial: bool,
}

/// Request to edit the metadata of a stored draw.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateDrawMetadataRequest {
    /// New notes; `None` keeps the current value.
    pub notes: Option<String>,
    /// New evidence link; `None` keeps the current value.
    pub evidence_url: Option<String>,
}

/// Result of replaying a stored draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyDrawResponse {
    pub draw_id: i64,
    /// Whether replay reproduced the stored winners.
    pub verified: bool,
    /// Winning numbers as stored.
    pub recorded: Vec<TicketNumber>,
    /// Winning numbers produced by replay.
    pub replayed: Vec<TicketNumber>,
}
