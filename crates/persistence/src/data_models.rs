// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and their conversion into domain and audit types.
//!
//! Rows store integers as `i64`/`i32` and enums as their string form;
//! conversion re-validates every value so a hand-edited row surfaces as
//! `ReconstructionError` instead of a panic.

use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use ticket_draw_audit::{
    Actor, ClaimStatus, DrawRecord, DrawResultEntry, NotificationStatus, SnapshotEntry,
    WinnerRecord,
};
use ticket_draw_domain::{
    Competition, CompetitionStatus, DrawMethod, DrawMode, Ticket, TicketNumber, TicketState,
};

use crate::diesel_schema::{competitions, draws, tickets, winners};
use crate::error::PersistenceError;

/// Fields needed to open a new competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompetition {
    pub title: String,
    /// `None` means unlimited.
    pub ticket_limit: Option<u32>,
    /// Unix seconds.
    pub draw_at: i64,
    pub draw_mode: DrawMode,
    pub winner_count: u32,
    pub reserve_count: u32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = competitions)]
pub(crate) struct CompetitionRow {
    pub competition_id: i64,
    pub title: String,
    pub ticket_limit: Option<i64>,
    pub tickets_sold: i64,
    pub status: String,
    pub draw_at: i64,
    pub draw_mode: String,
    pub winner_count: i32,
    pub reserve_count: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketRow {
    pub ticket_id: i64,
    pub competition_id: i64,
    pub ticket_number: i64,
    pub owner_id: Option<i64>,
    pub order_id: Option<i64>,
    pub state: String,
    pub reserved_at: Option<i64>,
    pub expires_at: Option<i64>,
}

#[derive(Insertable)]
#[diesel(table_name = tickets)]
pub(crate) struct NewTicketRow {
    pub competition_id: i64,
    pub ticket_number: i64,
    pub slot_number: Option<i64>,
    pub owner_id: Option<i64>,
    pub order_id: Option<i64>,
    pub state: String,
    pub reserved_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = draws)]
pub(crate) struct DrawRow {
    pub draw_id: i64,
    pub competition_id: i64,
    pub drawn_at: String,
    pub seed_hex: String,
    pub algorithm: String,
    pub snapshot_json: Option<String>,
    pub snapshot_count: i32,
    pub snapshot_digest: Option<String>,
    pub results_json: String,
    pub requested_winners: i32,
    pub method: String,
    pub initiated_by: Option<String>,
    pub initiator_type: Option<String>,
    pub notes: Option<String>,
    pub evidence_url: Option<String>,
    pub failure_reason: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = winners)]
pub(crate) struct WinnerRow {
    pub winner_id: i64,
    pub draw_id: i64,
    pub competition_id: i64,
    pub ticket_id: i64,
    pub ticket_number: i64,
    pub owner_id: Option<i64>,
    pub position: i32,
    pub is_reserve: i32,
    pub claim_code: String,
    pub notification_status: String,
    pub claim_status: String,
}

fn to_u32<T>(value: T, field: &str) -> Result<u32, PersistenceError>
where
    T: TryInto<u32> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        PersistenceError::ReconstructionError(format!("{field} out of range: {value}"))
    })
}

/// Narrows a count for an `INTEGER` column.
pub(crate) fn to_i32(value: u32, field: &str) -> Result<i32, PersistenceError> {
    i32::try_from(value)
        .map_err(|_| PersistenceError::Other(format!("{field} too large to store: {value}")))
}

/// Narrows a collection length for an `INTEGER` column.
pub(crate) fn len_to_i32(len: usize, field: &str) -> Result<i32, PersistenceError> {
    len.to_i32()
        .ok_or_else(|| PersistenceError::Other(format!("{field} too large to store: {len}")))
}

fn parse_field<T>(value: &str) -> Result<T, PersistenceError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| PersistenceError::ReconstructionError(e.to_string()))
}

fn ticket_number(value: i64) -> Result<TicketNumber, PersistenceError> {
    TicketNumber::new(value).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

impl CompetitionRow {
    pub(crate) fn into_competition(self) -> Result<Competition, PersistenceError> {
        let ticket_limit = match self.ticket_limit {
            Some(limit) => Some(to_u32(limit, "ticket_limit")?),
            None => None,
        };
        Ok(Competition {
            competition_id: self.competition_id,
            title: self.title,
            ticket_limit,
            tickets_sold: to_u32(self.tickets_sold, "tickets_sold")?,
            status: parse_field::<CompetitionStatus>(&self.status)?,
            draw_at: self.draw_at,
            draw_mode: parse_field::<DrawMode>(&self.draw_mode)?,
            winner_count: to_u32(self.winner_count, "winner_count")?,
            reserve_count: to_u32(self.reserve_count, "reserve_count")?,
        })
    }
}

impl TicketRow {
    pub(crate) fn into_ticket(self) -> Result<Ticket, PersistenceError> {
        Ok(Ticket {
            ticket_id: self.ticket_id,
            competition_id: self.competition_id,
            ticket_number: ticket_number(self.ticket_number)?,
            owner_id: self.owner_id,
            order_id: self.order_id,
            state: parse_field::<TicketState>(&self.state)?,
            reserved_at: self.reserved_at,
            expires_at: self.expires_at,
        })
    }
}

impl DrawRow {
    pub(crate) fn into_record(self) -> Result<DrawRecord, PersistenceError> {
        let snapshot: Option<Vec<SnapshotEntry>> = match self.snapshot_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        let results: Vec<DrawResultEntry> = serde_json::from_str(&self.results_json)?;
        let initiated_by = self.initiated_by.map(|id| {
            Actor::new(
                id,
                self.initiator_type.unwrap_or_else(|| String::from("unknown")),
            )
        });

        Ok(DrawRecord {
            draw_id: self.draw_id,
            competition_id: self.competition_id,
            drawn_at: self.drawn_at,
            seed_hex: self.seed_hex,
            algorithm: self.algorithm,
            snapshot,
            snapshot_count: to_u32(self.snapshot_count, "snapshot_count")?,
            snapshot_digest: self.snapshot_digest,
            results,
            requested_winners: to_u32(self.requested_winners, "requested_winners")?,
            method: parse_field::<DrawMethod>(&self.method)?,
            initiated_by,
            notes: self.notes,
            evidence_url: self.evidence_url,
            failure_reason: self.failure_reason,
        })
    }
}

impl WinnerRow {
    pub(crate) fn into_winner(self) -> Result<WinnerRecord, PersistenceError> {
        Ok(WinnerRecord {
            winner_id: self.winner_id,
            draw_id: self.draw_id,
            competition_id: self.competition_id,
            ticket_id: self.ticket_id,
            ticket_number: ticket_number(self.ticket_number)?,
            owner_id: self.owner_id,
            position: to_u32(self.position, "position")?,
            is_reserve: self.is_reserve != 0,
            claim_code: self.claim_code,
            notification_status: parse_field::<NotificationStatus>(&self.notification_status)?,
            claim_status: parse_field::<ClaimStatus>(&self.claim_status)?,
        })
    }
}
