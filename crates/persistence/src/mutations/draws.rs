// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Draw record and winner mutations.
//!
//! `record_draw` is the only writer of draw results. In one transaction it
//! stores the record, moves each winning ticket to `winner`, inserts the
//! winner rows and marks the competition `drawn`. Records are stored even
//! when the draw found no winners, so every claimed competition keeps an
//! audit trail.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use ticket_draw_audit::{
    ClaimStatus, DrawRecord, NewDrawRecord, NotificationStatus, WinnerRecord, generate_claim_code,
};
use ticket_draw_domain::{CompetitionStatus, TicketState};
use tracing::{debug, info, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::{CompetitionRow, DrawRow, WinnerRow, len_to_i32, to_i32};
use crate::diesel_schema::{competitions, draws, tickets, winners};
use crate::error::{PersistenceError, is_unique_violation};
use crate::transaction::{TransactionMode, with_transaction};

/// Claim codes are random; a collision is retried with a fresh code.
const CLAIM_CODE_ATTEMPTS: usize = 5;

backend_fn! {
/// Stores a draw record and applies its results.
///
/// Positions above `winner_count` are stored as reserve winners.
/// `drawn_at` is the RFC 3339 draw time and `now` the Unix-seconds clock
/// reading used for winner rows.
///
/// # Errors
///
/// - `InvalidDrawRecord` if the record is internally inconsistent
/// - `CompetitionNotFound` if the competition does not exist
/// - `CompetitionNotDrawable` if the competition was cancelled
/// - `AlreadyDrawn` if a successful record already exists
/// - `TicketNotEligible` if a winning ticket is no longer active
///
/// In atomic mode nothing is stored when any of these occur.
pub fn record_draw(
    conn: &mut _,
    mode: TransactionMode,
    record: &NewDrawRecord,
    winner_count: u32,
    drawn_at: &str,
    now: i64,
) -> Result<DrawRecord, PersistenceError> {
    record.validate()?;

    let competition_id: i64 = record.competition_id;
    let snapshot_json: String = serde_json::to_string(&record.snapshot)?;
    let results_json: String = serde_json::to_string(&record.results)?;
    let snapshot_count: i32 = len_to_i32(record.snapshot.len(), "snapshot_count")?;
    let result_count: i32 = len_to_i32(record.results.len(), "result_count")?;

    with_transaction(conn, mode, "record_draw", |conn| {
        let competition = competitions::table
            .find(competition_id)
            .select(CompetitionRow::as_select())
            .first::<CompetitionRow>(conn)
            .optional()?
            .ok_or(PersistenceError::CompetitionNotFound(competition_id))?
            .into_competition()?;
        if competition.status == CompetitionStatus::Cancelled {
            return Err(PersistenceError::CompetitionNotDrawable {
                competition_id,
                status: competition.status,
            });
        }

        let successful: i64 = draws::table
            .filter(draws::competition_id.eq(competition_id))
            .filter(draws::result_count.gt(0))
            .count()
            .get_result(conn)?;
        if successful > 0 {
            return Err(PersistenceError::AlreadyDrawn { competition_id });
        }

        diesel::insert_into(draws::table)
            .values((
                draws::competition_id.eq(competition_id),
                draws::drawn_at.eq(drawn_at),
                draws::seed_hex.eq(&record.seed_hex),
                draws::algorithm.eq(&record.algorithm),
                draws::snapshot_json.eq(Some(&snapshot_json)),
                draws::snapshot_count.eq(snapshot_count),
                draws::snapshot_digest.eq(Some(&record.snapshot_digest)),
                draws::results_json.eq(&results_json),
                draws::result_count.eq(result_count),
                draws::requested_winners.eq(to_i32(record.requested_winners, "requested_winners")?),
                draws::method.eq(record.method.as_str()),
                draws::initiated_by.eq(record.initiated_by.as_ref().map(|a| a.id.as_str())),
                draws::initiator_type.eq(record.initiated_by.as_ref().map(|a| a.actor_type.as_str())),
                draws::notes.eq(record.notes.as_deref()),
                draws::evidence_url.eq(record.evidence_url.as_deref()),
                draws::failure_reason.eq(record.failure.map(|f| f.as_str())),
            ))
            .execute(conn)?;
        let draw_id: i64 = conn.get_last_insert_rowid()?;

        for result in &record.results {
            let promoted: usize = diesel::update(
                tickets::table
                    .filter(tickets::ticket_id.eq(result.ticket_id))
                    .filter(tickets::competition_id.eq(competition_id))
                    .filter(tickets::ticket_number.eq(result.ticket_number.as_i64()))
                    .filter(tickets::state.eq(TicketState::Active.as_str())),
            )
            .set(tickets::state.eq(TicketState::Winner.as_str()))
            .execute(conn)?;
            if promoted != 1 {
                warn!(draw_id, ticket_id = result.ticket_id, "Winning ticket no longer active");
                return Err(PersistenceError::TicketNotEligible {
                    ticket_id: result.ticket_id,
                });
            }

            let is_reserve: i32 = i32::from(result.position > winner_count);
            let mut attempt: usize = 0;
            loop {
                attempt += 1;
                let inserted = diesel::insert_into(winners::table)
                    .values((
                        winners::draw_id.eq(draw_id),
                        winners::competition_id.eq(competition_id),
                        winners::ticket_id.eq(result.ticket_id),
                        winners::ticket_number.eq(result.ticket_number.as_i64()),
                        winners::owner_id.eq(result.owner_id),
                        winners::position.eq(to_i32(result.position, "position")?),
                        winners::is_reserve.eq(is_reserve),
                        winners::claim_code.eq(generate_claim_code()),
                        winners::notification_status.eq(NotificationStatus::Pending.as_str()),
                        winners::claim_status.eq(ClaimStatus::Unclaimed.as_str()),
                        winners::created_at.eq(now),
                    ))
                    .execute(conn);
                match inserted {
                    Ok(_) => break,
                    Err(err) if is_unique_violation(&err) && attempt < CLAIM_CODE_ATTEMPTS => {
                        debug!(draw_id, attempt, "Claim code collision, regenerating");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        let moved: usize = diesel::update(
            competitions::table
                .filter(competitions::competition_id.eq(competition_id))
                .filter(competitions::status.ne(CompetitionStatus::Drawn.as_str())),
        )
        .set(competitions::status.eq(CompetitionStatus::Drawn.as_str()))
        .execute(conn)?;

        let stored: DrawRecord = draws::table
            .find(draw_id)
            .select(DrawRow::as_select())
            .first::<DrawRow>(conn)?
            .into_record()?;

        info!(
            draw_id,
            competition_id,
            winners = stored.results.len(),
            failure = stored.failure_reason.as_deref().unwrap_or("none"),
            status_changed = moved == 1,
            "Draw recorded"
        );
        Ok(stored)
    })
}
}

backend_fn! {
/// Updates the editable metadata of a draw record.
///
/// Only `notes` and `evidence_url` may change after storage; `None`
/// leaves a field as it is.
///
/// # Errors
///
/// Returns `DrawNotFound` if no such record exists.
pub fn update_draw_metadata(
    conn: &mut _,
    draw_id: i64,
    notes: Option<&str>,
    evidence_url: Option<&str>,
) -> Result<DrawRecord, PersistenceError> {
    let existing: DrawRow = draws::table
        .find(draw_id)
        .select(DrawRow::as_select())
        .first::<DrawRow>(conn)
        .optional()?
        .ok_or(PersistenceError::DrawNotFound(draw_id))?;

    let next_notes: Option<String> = notes.map(str::to_string).or(existing.notes);
    let next_evidence: Option<String> = evidence_url.map(str::to_string).or(existing.evidence_url);

    diesel::update(draws::table.find(draw_id))
        .set((
            draws::notes.eq(&next_notes),
            draws::evidence_url.eq(&next_evidence),
        ))
        .execute(conn)?;

    info!(draw_id, "Draw metadata updated");

    draws::table
        .find(draw_id)
        .select(DrawRow::as_select())
        .first::<DrawRow>(conn)?
        .into_record()
}
}

backend_fn! {
/// Records that a winner has been notified.
///
/// # Errors
///
/// Returns `WinnerNotFound` if no such winner exists.
pub fn mark_winner_notified(conn: &mut _, winner_id: i64) -> Result<WinnerRecord, PersistenceError> {
    let updated: usize = diesel::update(winners::table.find(winner_id))
        .set(winners::notification_status.eq(NotificationStatus::Sent.as_str()))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::WinnerNotFound(winner_id.to_string()));
    }

    debug!(winner_id, "Winner notified");

    winners::table
        .find(winner_id)
        .select(WinnerRow::as_select())
        .first::<WinnerRow>(conn)?
        .into_winner()
}
}

backend_fn! {
/// Marks the prize behind a claim code as claimed.
///
/// Claiming is idempotent: a second claim returns the same record.
///
/// # Errors
///
/// Returns `WinnerNotFound` if no winner holds the code.
pub fn mark_winner_claimed(conn: &mut _, claim_code: &str) -> Result<WinnerRecord, PersistenceError> {
    let updated: usize = diesel::update(winners::table.filter(winners::claim_code.eq(claim_code)))
        .set(winners::claim_status.eq(ClaimStatus::Claimed.as_str()))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::WinnerNotFound(claim_code.to_string()));
    }

    info!(claim_code, "Prize claimed");

    winners::table
        .filter(winners::claim_code.eq(claim_code))
        .select(WinnerRow::as_select())
        .first::<WinnerRow>(conn)?
        .into_winner()
}
}
