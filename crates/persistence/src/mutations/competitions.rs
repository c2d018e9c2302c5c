// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Competition mutations.
//!
//! Status changes are conditional updates: the `WHERE` clause names the
//! statuses the change may start from, and a zero row count means another
//! writer moved the competition first. Claiming a draw relies on this so
//! that two schedulers can never both move the same competition to
//! `ended`.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use ticket_draw_domain::{Competition, CompetitionStatus, validate_winner_count};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{CompetitionRow, NewCompetition, to_i32};
use crate::diesel_schema::{competitions, draws};
use crate::error::PersistenceError;
use crate::transaction::{TransactionMode, with_transaction};

/// Builds the error for a status change that matched no row.
fn rejected_transition(
    competition_id: i64,
    current: Option<CompetitionStatus>,
    target: CompetitionStatus,
) -> PersistenceError {
    match current {
        None => PersistenceError::CompetitionNotFound(competition_id),
        Some(from) => match from.validate_transition(target) {
            Err(err) => PersistenceError::DomainViolation(err),
            Ok(()) => PersistenceError::Other(format!(
                "Competition {competition_id} changed status concurrently"
            )),
        },
    }
}

backend_fn! {
/// Creates a competition in the `live` status.
///
/// # Errors
///
/// Returns an error if the winner count is zero or the insert fails.
pub fn create_competition(
    conn: &mut _,
    competition: &NewCompetition,
    now: i64,
) -> Result<i64, PersistenceError> {
    validate_winner_count(competition.winner_count)?;

    diesel::insert_into(competitions::table)
        .values((
            competitions::title.eq(&competition.title),
            competitions::ticket_limit.eq(competition.ticket_limit.map(i64::from)),
            competitions::tickets_sold.eq(0_i64),
            competitions::status.eq(CompetitionStatus::Live.as_str()),
            competitions::draw_at.eq(competition.draw_at),
            competitions::draw_mode.eq(competition.draw_mode.as_str()),
            competitions::winner_count.eq(to_i32(competition.winner_count, "winner_count")?),
            competitions::reserve_count.eq(to_i32(competition.reserve_count, "reserve_count")?),
            competitions::created_at.eq(now),
        ))
        .execute(conn)?;

    let competition_id: i64 = conn.get_last_insert_rowid()?;

    info!(competition_id, title = %competition.title, "Competition created");
    Ok(competition_id)
}
}

backend_fn! {
/// Moves a competition from one of `from` to `target`.
///
/// # Errors
///
/// Returns `CompetitionNotFound` if the competition does not exist, or a
/// domain violation if its current status does not permit the change.
pub fn transition_competition(
    conn: &mut _,
    competition_id: i64,
    from: &[CompetitionStatus],
    target: CompetitionStatus,
) -> Result<(), PersistenceError> {
    let allowed: Vec<&str> = from.iter().map(CompetitionStatus::as_str).collect();

    let updated: usize = diesel::update(
        competitions::table
            .filter(competitions::competition_id.eq(competition_id))
            .filter(competitions::status.eq_any(allowed)),
    )
    .set(competitions::status.eq(target.as_str()))
    .execute(conn)?;

    if updated == 1 {
        debug!(competition_id, status = %target, "Competition status changed");
        return Ok(());
    }

    let current: Option<String> = competitions::table
        .find(competition_id)
        .select(competitions::status)
        .first::<String>(conn)
        .optional()?;
    let current: Option<CompetitionStatus> = current.map(|s| s.parse::<CompetitionStatus>()).transpose()?;
    Err(rejected_transition(competition_id, current, target))
}
}

backend_fn! {
/// Atomically claims a competition for drawing by moving it from `live`
/// or `closed` to `ended`.
///
/// Exactly one caller observes success; every other concurrent caller
/// sees zero rows updated and receives an error.
///
/// # Errors
///
/// - `AlreadyDrawn` if the competition is already `drawn`
/// - `CompetitionNotDrawable` if it is in any other non-drawable status
/// - `CompetitionNotFound` if it does not exist
pub fn claim_for_draw(conn: &mut _, competition_id: i64) -> Result<Competition, PersistenceError> {
    let updated: usize = diesel::update(
        competitions::table
            .filter(competitions::competition_id.eq(competition_id))
            .filter(competitions::status.eq_any(CompetitionStatus::DRAWABLE.map(|s| s.as_str()))),
    )
    .set(competitions::status.eq(CompetitionStatus::Ended.as_str()))
    .execute(conn)?;

    let competition: Competition = competitions::table
        .find(competition_id)
        .select(CompetitionRow::as_select())
        .first::<CompetitionRow>(conn)
        .optional()?
        .ok_or(PersistenceError::CompetitionNotFound(competition_id))?
        .into_competition()?;

    if updated == 1 {
        info!(competition_id, "Competition claimed for drawing");
        return Ok(competition);
    }

    debug!(competition_id, status = %competition.status, "Draw claim lost");
    match competition.status {
        CompetitionStatus::Drawn => Err(PersistenceError::AlreadyDrawn { competition_id }),
        status => Err(PersistenceError::CompetitionNotDrawable {
            competition_id,
            status,
        }),
    }
}
}

backend_fn! {
/// Returns an `ended` competition to `closed` so it can be drawn again.
///
/// Used after a draw attempt failed before recording anything. Refused
/// once a successful draw exists.
///
/// # Errors
///
/// Returns `AlreadyDrawn` if a successful draw exists, or a domain
/// violation if the competition is not `ended`.
pub fn reopen_for_draw(
    conn: &mut _,
    mode: TransactionMode,
    competition_id: i64,
) -> Result<(), PersistenceError> {
    with_transaction(conn, mode, "reopen_for_draw", |conn| {
        let successful: i64 = draws::table
            .filter(draws::competition_id.eq(competition_id))
            .filter(draws::result_count.gt(0))
            .count()
            .get_result(conn)?;
        if successful > 0 {
            return Err(PersistenceError::AlreadyDrawn { competition_id });
        }

        let updated: usize = diesel::update(
            competitions::table
                .filter(competitions::competition_id.eq(competition_id))
                .filter(competitions::status.eq(CompetitionStatus::Ended.as_str())),
        )
        .set(competitions::status.eq(CompetitionStatus::Closed.as_str()))
        .execute(conn)?;

        if updated == 1 {
            info!(competition_id, "Competition reopened for drawing");
            return Ok(());
        }

        let current: Option<String> = competitions::table
            .find(competition_id)
            .select(competitions::status)
            .first::<String>(conn)
            .optional()?;
        let current: Option<CompetitionStatus> = current.map(|s| s.parse::<CompetitionStatus>()).transpose()?;
        Err(rejected_transition(competition_id, current, CompetitionStatus::Closed))
    })
}
}
