// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket ledger mutations.
//!
//! Every row that holds a number carries `slot_number = ticket_number`;
//! the `(competition_id, slot_number)` unique index therefore rejects a
//! second live row for the same number no matter how two writers
//! interleave. Rows leave the index either by deletion (released or
//! expired reservations) or by clearing `slot_number` (cancelled,
//! refunded, invalid).

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use ticket_draw_domain::{Ticket, TicketNumber, TicketState};
use tracing::{debug, info, warn};

use crate::data_models::{CompetitionRow, NewTicketRow, TicketRow};
use crate::diesel_schema::{competitions, tickets};
use crate::error::{PersistenceError, is_unique_violation};
use crate::transaction::{TransactionMode, with_transaction};

fn storage_numbers(numbers: &[TicketNumber]) -> Vec<i64> {
    numbers.iter().map(TicketNumber::as_i64).collect()
}

/// Splits held rows into numbers still live at `now` and the IDs of
/// expired reservations.
fn partition_held(
    rows: Vec<TicketRow>,
    now: i64,
) -> Result<(Vec<TicketNumber>, Vec<i64>), PersistenceError> {
    let mut live: Vec<TicketNumber> = Vec::new();
    let mut expired: Vec<i64> = Vec::new();
    for row in rows {
        let ticket: Ticket = row.into_ticket()?;
        if ticket.is_live_at(now) {
            live.push(ticket.ticket_number);
        } else {
            expired.push(ticket.ticket_id);
        }
    }
    live.sort_unstable();
    Ok((live, expired))
}

backend_fn! {
/// Inserts reservation rows for `numbers` in one transaction.
///
/// The numbers must already be validated and distinct. Expired
/// reservations on any requested number are deleted first. If any
/// requested number is still held, nothing is inserted and the error
/// names every conflicting number.
///
/// # Errors
///
/// - `CompetitionNotFound` if the competition does not exist
/// - `NotAcceptingEntries` if the competition is not `live`
/// - `TicketConflict` if any number is held, including a concurrent insert
///   caught by the unique index
pub fn allocate_tickets(
    conn: &mut _,
    mode: TransactionMode,
    competition_id: i64,
    numbers: &[TicketNumber],
    owner_id: i64,
    now: i64,
    expires_at: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    with_transaction(conn, mode, "allocate_tickets", |conn| {
        let competition = competitions::table
            .find(competition_id)
            .select(CompetitionRow::as_select())
            .first::<CompetitionRow>(conn)
            .optional()?
            .ok_or(PersistenceError::CompetitionNotFound(competition_id))?
            .into_competition()?;
        if !competition.status.accepts_entries() {
            return Err(PersistenceError::NotAcceptingEntries {
                competition_id,
                status: competition.status,
            });
        }

        let requested: Vec<i64> = storage_numbers(numbers);
        let held: Vec<TicketRow> = tickets::table
            .filter(tickets::competition_id.eq(competition_id))
            .filter(tickets::ticket_number.eq_any(&requested))
            .filter(tickets::slot_number.is_not_null())
            .select(TicketRow::as_select())
            .load(conn)?;
        let (conflicts, expired) = partition_held(held, now)?;
        if !conflicts.is_empty() {
            debug!(competition_id, conflicts = conflicts.len(), "Requested numbers already held");
            return Err(PersistenceError::TicketConflict { numbers: conflicts });
        }
        if !expired.is_empty() {
            diesel::delete(tickets::table.filter(tickets::ticket_id.eq_any(&expired)))
                .execute(conn)?;
            debug!(competition_id, removed = expired.len(), "Cleared expired reservations in the way");
        }

        let rows: Vec<NewTicketRow> = requested
            .iter()
            .map(|&number| NewTicketRow {
                competition_id,
                ticket_number: number,
                slot_number: Some(number),
                owner_id: Some(owner_id),
                order_id: None,
                state: TicketState::Reserved.as_str().to_string(),
                reserved_at: Some(now),
                expires_at: Some(expires_at),
                created_at: now,
            })
            .collect();

        match diesel::insert_into(tickets::table).values(&rows).execute(conn) {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                // Lost a race on the slot index; name what is held now.
                let held: Vec<TicketRow> = tickets::table
                    .filter(tickets::competition_id.eq(competition_id))
                    .filter(tickets::ticket_number.eq_any(&requested))
                    .filter(tickets::slot_number.is_not_null())
                    .select(TicketRow::as_select())
                    .load(conn)?;
                let (conflicts, _) = partition_held(held, now)?;
                warn!(competition_id, "Reservation insert hit the slot uniqueness constraint");
                return Err(PersistenceError::TicketConflict { numbers: conflicts });
            }
            Err(err) => return Err(err.into()),
        }

        let inserted: Vec<TicketRow> = tickets::table
            .filter(tickets::competition_id.eq(competition_id))
            .filter(tickets::ticket_number.eq_any(&requested))
            .filter(tickets::slot_number.is_not_null())
            .order(tickets::ticket_number.asc())
            .select(TicketRow::as_select())
            .load(conn)?;

        info!(competition_id, owner_id, count = inserted.len(), "Tickets reserved");
        inserted.into_iter().map(TicketRow::into_ticket).collect()
    })
}
}

backend_fn! {
/// Deletes an owner's unordered reservations for the given numbers.
///
/// Numbers the owner does not hold are ignored.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn release_reservations(
    conn: &mut _,
    competition_id: i64,
    owner_id: i64,
    numbers: &[TicketNumber],
) -> Result<usize, PersistenceError> {
    let requested: Vec<i64> = storage_numbers(numbers);
    let released: usize = diesel::delete(
        tickets::table
            .filter(tickets::competition_id.eq(competition_id))
            .filter(tickets::owner_id.eq(owner_id))
            .filter(tickets::ticket_number.eq_any(&requested))
            .filter(tickets::state.eq(TicketState::Reserved.as_str()))
            .filter(tickets::order_id.is_null()),
    )
    .execute(conn)?;

    info!(competition_id, owner_id, released, "Reservations released");
    Ok(released)
}
}

backend_fn! {
/// Attaches live reservations to an order and extends their hold to
/// `hold_until` while payment is processed.
///
/// `reserved_at` restarts at `now` so the safety-net sweep measures the
/// extended hold, not the original one.
///
/// # Errors
///
/// Returns `ReservationNotFound` naming every number the owner does not
/// hold as an unexpired, unordered reservation; nothing is attached in
/// that case.
#[allow(clippy::too_many_arguments)]
pub fn attach_order(
    conn: &mut _,
    mode: TransactionMode,
    competition_id: i64,
    owner_id: i64,
    numbers: &[TicketNumber],
    order_id: i64,
    hold_until: i64,
    now: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    with_transaction(conn, mode, "attach_order", |conn| {
        let requested: Vec<i64> = storage_numbers(numbers);
        let held: Vec<TicketRow> = tickets::table
            .filter(tickets::competition_id.eq(competition_id))
            .filter(tickets::owner_id.eq(owner_id))
            .filter(tickets::ticket_number.eq_any(&requested))
            .filter(tickets::state.eq(TicketState::Reserved.as_str()))
            .filter(tickets::order_id.is_null())
            .filter(tickets::expires_at.gt(now))
            .select(TicketRow::as_select())
            .load(conn)?;

        if held.len() != requested.len() {
            let mut missing: Vec<TicketNumber> = numbers
                .iter()
                .copied()
                .filter(|n| !held.iter().any(|row| row.ticket_number == n.as_i64()))
                .collect();
            missing.sort_unstable();
            return Err(PersistenceError::ReservationNotFound { numbers: missing });
        }

        let ids: Vec<i64> = held.iter().map(|row| row.ticket_id).collect();
        diesel::update(tickets::table.filter(tickets::ticket_id.eq_any(&ids)))
            .set((
                tickets::order_id.eq(Some(order_id)),
                tickets::expires_at.eq(Some(hold_until)),
                tickets::reserved_at.eq(Some(now)),
            ))
            .execute(conn)?;

        let attached: Vec<TicketRow> = tickets::table
            .filter(tickets::ticket_id.eq_any(&ids))
            .order(tickets::ticket_number.asc())
            .select(TicketRow::as_select())
            .load(conn)?;

        info!(competition_id, owner_id, order_id, count = attached.len(), "Reservations attached to order");
        attached.into_iter().map(TicketRow::into_ticket).collect()
    })
}
}

backend_fn! {
/// Promotes every reservation of a paid order to `active` and counts the
/// tickets as sold.
///
/// Whatever reserved rows still exist for the order are promoted; rows
/// already swept are not resurrected. Promoting an order twice is a
/// no-op the second time.
///
/// # Errors
///
/// Returns an error if an update fails; in atomic mode nothing is
/// promoted in that case.
pub fn confirm_order_payment(
    conn: &mut _,
    mode: TransactionMode,
    order_id: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    with_transaction(conn, mode, "confirm_order_payment", |conn| {
        let reserved: Vec<TicketRow> = tickets::table
            .filter(tickets::order_id.eq(order_id))
            .filter(tickets::state.eq(TicketState::Reserved.as_str()))
            .select(TicketRow::as_select())
            .load(conn)?;

        let mut promoted_ids: Vec<i64> = Vec::with_capacity(reserved.len());
        for row in reserved {
            let ticket: Ticket = row.into_ticket()?;
            ticket.state.validate_transition(TicketState::Active)?;

            let updated: usize = diesel::update(
                tickets::table
                    .filter(tickets::ticket_id.eq(ticket.ticket_id))
                    .filter(tickets::state.eq(TicketState::Reserved.as_str())),
            )
            .set((
                tickets::state.eq(TicketState::Active.as_str()),
                tickets::expires_at.eq(None::<i64>),
            ))
            .execute(conn)?;
            if updated == 0 {
                continue;
            }

            diesel::update(competitions::table.find(ticket.competition_id))
                .set(competitions::tickets_sold.eq(competitions::tickets_sold + 1_i64))
                .execute(conn)?;

            promoted_ids.push(ticket.ticket_id);
        }

        let promoted: Vec<TicketRow> = tickets::table
            .filter(tickets::ticket_id.eq_any(&promoted_ids))
            .order((tickets::competition_id.asc(), tickets::ticket_number.asc()))
            .select(TicketRow::as_select())
            .load(conn)?;

        info!(order_id, count = promoted.len(), "Order tickets promoted to active");
        promoted.into_iter().map(TicketRow::into_ticket).collect()
    })
}
}

backend_fn! {
/// Deletes the reservations of an order whose payment failed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn fail_order_payment(conn: &mut _, order_id: i64) -> Result<usize, PersistenceError> {
    let released: usize = diesel::delete(
        tickets::table
            .filter(tickets::order_id.eq(order_id))
            .filter(tickets::state.eq(TicketState::Reserved.as_str())),
    )
    .execute(conn)?;

    info!(order_id, released, "Reservations released after failed payment");
    Ok(released)
}
}

backend_fn! {
/// Moves every active ticket of an order to `target` (`cancelled` or
/// `refunded`), frees their numbers, and deletes any of the order's
/// remaining reservations.
///
/// Winning tickets are left untouched.
///
/// # Errors
///
/// Returns a domain violation if `target` is not reachable from
/// `active`, or an error if an update fails.
pub fn retire_order_tickets(
    conn: &mut _,
    mode: TransactionMode,
    order_id: i64,
    target: TicketState,
) -> Result<Vec<Ticket>, PersistenceError> {
    TicketState::Active.validate_transition(target)?;

    with_transaction(conn, mode, "retire_order_tickets", |conn| {
        let active: Vec<TicketRow> = tickets::table
            .filter(tickets::order_id.eq(order_id))
            .filter(tickets::state.eq(TicketState::Active.as_str()))
            .select(TicketRow::as_select())
            .load(conn)?;

        let mut retired_ids: Vec<i64> = Vec::with_capacity(active.len());
        for row in active {
            diesel::update(tickets::table.find(row.ticket_id))
                .set((
                    tickets::state.eq(target.as_str()),
                    tickets::slot_number.eq(None::<i64>),
                ))
                .execute(conn)?;

            diesel::update(
                competitions::table
                    .find(row.competition_id)
                    .filter(competitions::tickets_sold.gt(0_i64)),
            )
            .set(competitions::tickets_sold.eq(competitions::tickets_sold - 1_i64))
            .execute(conn)?;

            retired_ids.push(row.ticket_id);
        }

        let released: usize = diesel::delete(
            tickets::table
                .filter(tickets::order_id.eq(order_id))
                .filter(tickets::state.eq(TicketState::Reserved.as_str())),
        )
        .execute(conn)?;

        let retired: Vec<TicketRow> = tickets::table
            .filter(tickets::ticket_id.eq_any(&retired_ids))
            .order((tickets::competition_id.asc(), tickets::ticket_number.asc()))
            .select(TicketRow::as_select())
            .load(conn)?;

        info!(order_id, state = %target, retired = retired.len(), released, "Order tickets retired");
        retired.into_iter().map(TicketRow::into_ticket).collect()
    })
}
}

backend_fn! {
/// Marks a single active ticket `invalid` and frees its number.
///
/// # Errors
///
/// Returns `TicketNotFound` if the ticket does not exist, or a domain
/// violation if it is not `active`.
pub fn invalidate_ticket(
    conn: &mut _,
    mode: TransactionMode,
    ticket_id: i64,
) -> Result<Ticket, PersistenceError> {
    with_transaction(conn, mode, "invalidate_ticket", |conn| {
        let ticket: Ticket = tickets::table
            .find(ticket_id)
            .select(TicketRow::as_select())
            .first::<TicketRow>(conn)
            .optional()?
            .ok_or(PersistenceError::TicketNotFound(ticket_id))?
            .into_ticket()?;
        ticket.state.validate_transition(TicketState::Invalid)?;

        diesel::update(tickets::table.find(ticket_id))
            .set((
                tickets::state.eq(TicketState::Invalid.as_str()),
                tickets::slot_number.eq(None::<i64>),
            ))
            .execute(conn)?;
        diesel::update(
            competitions::table
                .find(ticket.competition_id)
                .filter(competitions::tickets_sold.gt(0_i64)),
        )
        .set(competitions::tickets_sold.eq(competitions::tickets_sold - 1_i64))
        .execute(conn)?;

        info!(ticket_id, ticket_number = %ticket.ticket_number, "Ticket invalidated");
        Ok(Ticket {
            state: TicketState::Invalid,
            ..ticket
        })
    })
}
}

backend_fn! {
/// Deletes every reservation whose expiry is at or before `now`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_reservations(conn: &mut _, now: i64) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(
        tickets::table
            .filter(tickets::state.eq(TicketState::Reserved.as_str()))
            .filter(tickets::expires_at.le(now)),
    )
    .execute(conn)?;

    debug!(now, deleted, "Expired reservations swept");
    Ok(deleted)
}
}

backend_fn! {
/// Deletes every reservation created at or before `cutoff`, whatever its
/// recorded expiry.
///
/// Catches rows whose expiry was never set or was extended far beyond
/// the configured hold.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_stale_reservations(conn: &mut _, cutoff: i64) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(
        tickets::table
            .filter(tickets::state.eq(TicketState::Reserved.as_str()))
            .filter(tickets::reserved_at.le(cutoff)),
    )
    .execute(conn)?;

    if deleted > 0 {
        warn!(cutoff, deleted, "Stale reservations removed by safety-net sweep");
    }
    Ok(deleted)
}
}
