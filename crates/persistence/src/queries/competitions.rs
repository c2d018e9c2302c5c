// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Competition queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use ticket_draw_domain::{Competition, CompetitionStatus, DrawMode};
use tracing::debug;

use crate::data_models::CompetitionRow;
use crate::diesel_schema::competitions;
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a competition by ID.
///
/// # Errors
///
/// Returns `CompetitionNotFound` if no such competition exists.
pub fn get_competition(conn: &mut _, competition_id: i64) -> Result<Competition, PersistenceError> {
    competitions::table
        .find(competition_id)
        .select(CompetitionRow::as_select())
        .first::<CompetitionRow>(conn)
        .optional()?
        .ok_or(PersistenceError::CompetitionNotFound(competition_id))?
        .into_competition()
}
}

backend_fn! {
/// Lists automatic-mode competitions whose draw time has passed and that
/// have not been claimed by a draw yet, earliest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_due_competitions(conn: &mut _, now: i64) -> Result<Vec<Competition>, PersistenceError> {
    let rows: Vec<CompetitionRow> = competitions::table
        .filter(competitions::status.eq_any(CompetitionStatus::DRAWABLE.map(|s| s.as_str())))
        .filter(competitions::draw_mode.eq(DrawMode::Automatic.as_str()))
        .filter(competitions::draw_at.le(now))
        .order((competitions::draw_at.asc(), competitions::competition_id.asc()))
        .select(CompetitionRow::as_select())
        .load(conn)?;

    debug!(now, due = rows.len(), "Loaded competitions due for drawing");

    rows.into_iter().map(CompetitionRow::into_competition).collect()
}
}
