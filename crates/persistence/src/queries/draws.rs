// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Draw record and winner queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use ticket_draw_audit::{DrawRecord, WinnerRecord};

use crate::data_models::{DrawRow, WinnerRow};
use crate::diesel_schema::{draws, winners};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a draw record by ID.
///
/// # Errors
///
/// Returns `DrawNotFound` if no such record exists, or a serialization
/// error if the stored JSON cannot be decoded.
pub fn get_draw(conn: &mut _, draw_id: i64) -> Result<DrawRecord, PersistenceError> {
    draws::table
        .find(draw_id)
        .select(DrawRow::as_select())
        .first::<DrawRow>(conn)
        .optional()?
        .ok_or(PersistenceError::DrawNotFound(draw_id))?
        .into_record()
}
}

backend_fn! {
/// Lists every draw record for a competition, oldest first.
///
/// A competition may hold several failure records but at most one
/// successful record.
///
/// # Errors
///
/// Returns an error if the query fails or a record cannot be decoded.
pub fn list_draws(conn: &mut _, competition_id: i64) -> Result<Vec<DrawRecord>, PersistenceError> {
    let rows: Vec<DrawRow> = draws::table
        .filter(draws::competition_id.eq(competition_id))
        .order(draws::draw_id.asc())
        .select(DrawRow::as_select())
        .load(conn)?;

    rows.into_iter().map(DrawRow::into_record).collect()
}
}

backend_fn! {
/// Whether a draw with at least one winner exists for the competition.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn has_successful_draw(conn: &mut _, competition_id: i64) -> Result<bool, PersistenceError> {
    let count: i64 = draws::table
        .filter(draws::competition_id.eq(competition_id))
        .filter(draws::result_count.gt(0))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
}

backend_fn! {
/// Lists the winners of a draw by position.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_winners(conn: &mut _, draw_id: i64) -> Result<Vec<WinnerRecord>, PersistenceError> {
    let rows: Vec<WinnerRow> = winners::table
        .filter(winners::draw_id.eq(draw_id))
        .order(winners::position.asc())
        .select(WinnerRow::as_select())
        .load(conn)?;

    rows.into_iter().map(WinnerRow::into_winner).collect()
}
}

backend_fn! {
/// Looks up a winner by claim code.
///
/// # Errors
///
/// Returns `WinnerNotFound` if no winner holds the code.
pub fn get_winner_by_claim_code(
    conn: &mut _,
    claim_code: &str,
) -> Result<WinnerRecord, PersistenceError> {
    winners::table
        .filter(winners::claim_code.eq(claim_code))
        .select(WinnerRow::as_select())
        .first::<WinnerRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::WinnerNotFound(claim_code.to_string()))?
        .into_winner()
}
}
