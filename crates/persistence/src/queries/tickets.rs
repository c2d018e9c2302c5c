// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket ledger queries.
//!
//! A number is taken while a row holds its slot: any active or winning
//! ticket, or a reservation whose expiry is still in the future. Expired
//! reservations are treated as absent even before a sweep deletes them.

use std::collections::BTreeSet;

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use ticket_draw_audit::SnapshotEntry;
use ticket_draw_domain::{Ticket, TicketNumber, TicketState};
use tracing::debug;

use crate::data_models::TicketRow;
use crate::diesel_schema::tickets;
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a ticket by ID.
///
/// # Errors
///
/// Returns `TicketNotFound` if no such ticket exists.
pub fn get_ticket(conn: &mut _, ticket_id: i64) -> Result<Ticket, PersistenceError> {
    tickets::table
        .find(ticket_id)
        .select(TicketRow::as_select())
        .first::<TicketRow>(conn)
        .optional()?
        .ok_or(PersistenceError::TicketNotFound(ticket_id))?
        .into_ticket()
}
}

backend_fn! {
/// Returns every number currently held in a competition.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn taken_numbers(
    conn: &mut _,
    competition_id: i64,
    now: i64,
) -> Result<BTreeSet<TicketNumber>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::competition_id.eq(competition_id))
        .filter(tickets::slot_number.is_not_null())
        .select(TicketRow::as_select())
        .load(conn)?;

    let mut taken: BTreeSet<TicketNumber> = BTreeSet::new();
    for row in rows {
        let ticket: Ticket = row.into_ticket()?;
        if ticket.is_live_at(now) {
            taken.insert(ticket.ticket_number);
        }
    }

    debug!(competition_id, taken = taken.len(), "Loaded taken ticket numbers");
    Ok(taken)
}
}

backend_fn! {
/// Lists an owner's tickets in a competition, ascending by number.
///
/// Released and expired reservations are not included.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_owner_tickets(
    conn: &mut _,
    competition_id: i64,
    owner_id: i64,
    now: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::competition_id.eq(competition_id))
        .filter(tickets::owner_id.eq(owner_id))
        .order(tickets::ticket_number.asc())
        .select(TicketRow::as_select())
        .load(conn)?;

    let mut owned: Vec<Ticket> = Vec::with_capacity(rows.len());
    for row in rows {
        let ticket: Ticket = row.into_ticket()?;
        if ticket.state != TicketState::Reserved || ticket.is_live_at(now) {
            owned.push(ticket);
        }
    }
    Ok(owned)
}
}

backend_fn! {
/// Lists every ticket attached to an order, ascending by number.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_order_tickets(conn: &mut _, order_id: i64) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::order_id.eq(order_id))
        .order((tickets::competition_id.asc(), tickets::ticket_number.asc()))
        .select(TicketRow::as_select())
        .load(conn)?;

    rows.into_iter().map(TicketRow::into_ticket).collect()
}
}

backend_fn! {
/// Captures the draw snapshot: every active ticket in the competition,
/// strictly ascending by ticket number.
///
/// The slot index guarantees at most one holder per number, so the
/// ordering is total.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn snapshot_active_tickets(
    conn: &mut _,
    competition_id: i64,
) -> Result<Vec<SnapshotEntry>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::competition_id.eq(competition_id))
        .filter(tickets::state.eq(TicketState::Active.as_str()))
        .order(tickets::ticket_number.asc())
        .select(TicketRow::as_select())
        .load(conn)?;

    let mut snapshot: Vec<SnapshotEntry> = Vec::with_capacity(rows.len());
    for row in rows {
        let ticket: Ticket = row.into_ticket()?;
        snapshot.push(SnapshotEntry {
            ticket_id: ticket.ticket_id,
            ticket_number: ticket.ticket_number,
            owner_id: ticket.owner_id,
        });
    }

    debug!(competition_id, entries = snapshot.len(), "Captured draw snapshot");
    Ok(snapshot)
}
}
