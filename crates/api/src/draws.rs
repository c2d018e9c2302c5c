// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Draw orchestration, recording and verification.
//!
//! `execute_draw` claims the competition before reading its snapshot, so no
//! ticket can become eligible after the snapshot is taken. Selection
//! failures after the claim become stored failure records; the competition
//! always ends up `drawn` with an audit trail.

use std::sync::Arc;

use num_traits::ToPrimitive;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, warn};

use ticket_draw::{
    ALGORITHM, Clock, DrawError, Seed, generate_seed, pick_winners_bounded, replay_record,
    snapshot_digest,
};
use ticket_draw_audit::{
    Actor, DrawFailure, DrawRecord, NewDrawRecord, SnapshotEntry, WinnerRecord,
};
use ticket_draw_domain::{Competition, DrawMethod};
use ticket_draw_persistence::Persistence;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::config::ServiceConfig;
use crate::error::{ApiError, translate_draw_error, translate_persistence_error};
use crate::request_response::{
    CreateDrawRecordRequest, DrawOutcome, DrawRun, UpdateDrawMetadataRequest, VerifyDrawResponse,
};

/// Runs, records and verifies draws.
pub struct DrawService {
    config: ServiceConfig,
    clock: Arc<dyn Clock>,
}

impl DrawService {
    #[must_use]
    pub const fn new(config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Selects winners from the competition's current active tickets.
    ///
    /// Nothing is stored. A `seed` is only supplied when reproducing an
    /// earlier draw; live draws pass `None` and get a fresh seed.
    ///
    /// # Errors
    ///
    /// Returns `EmptySnapshot` if no ticket is active, `OversizedRequest` if
    /// `winners` exceeds the active count, or `InvalidInput` if `winners`
    /// is zero.
    pub fn run_draw(
        &self,
        persistence: &mut Persistence,
        competition_id: i64,
        winners: u32,
        seed: Option<Seed>,
    ) -> Result<DrawRun, ApiError> {
        let snapshot = persistence
            .snapshot_active_tickets(competition_id)
            .map_err(translate_persistence_error)?;
        let seed = seed.unwrap_or_else(generate_seed);
        self.select(competition_id, &seed, snapshot, winners)
            .map_err(translate_draw_error)
    }

    fn select(
        &self,
        competition_id: i64,
        seed: &Seed,
        snapshot: Vec<SnapshotEntry>,
        winners: u32,
    ) -> Result<DrawRun, DrawError> {
        let selection =
            pick_winners_bounded(seed, &snapshot, winners, self.config.draw_attempt_multiplier())?;
        Ok(DrawRun {
            competition_id,
            seed_hex: seed.to_hex(),
            results: selection.to_results(),
            snapshot,
            requested_winners: winners,
        })
    }

    /// Stores a draw record and applies it: winners become `winner`,
    /// winner rows are created and the competition becomes `drawn`.
    ///
    /// A record with no results is accepted only when the snapshot could
    /// not satisfy the request; its failure reason is derived and noted.
    /// A competition that is still `live` or `closed` is claimed first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An admin-triggered or manual record has no Admin initiator
    /// - The record has no winners although the snapshot had enough tickets
    /// - The competition already has a successful draw
    /// - A winner is no longer active
    pub fn create_draw_record(
        &self,
        persistence: &mut Persistence,
        request: &CreateDrawRecordRequest,
        initiator: Option<&AuthenticatedActor>,
    ) -> Result<DrawRecord, ApiError> {
        let initiated_by = authorize_initiator(request.method, initiator)?;

        let failure = if request.results.is_empty() {
            let failure = failure_reason(&request.snapshot, request.requested_winners).ok_or_else(
                || ApiError::InvalidInput {
                    field: String::from("results"),
                    message: String::from(
                        "A draw over a sufficient snapshot must name at least one winner",
                    ),
                },
            )?;
            Some(failure)
        } else {
            None
        };

        let found = request.results.len();
        let system_note = match failure {
            Some(failure) => Some(failure.audit_note()),
            None if found < request.requested_winners as usize => Some(format!(
                "Partial draw: found {found} of {} requested winners",
                request.requested_winners
            )),
            None => None,
        };

        let mut competition: Competition = persistence
            .get_competition(request.competition_id)
            .map_err(translate_persistence_error)?;
        if competition.status.is_drawable() {
            // Recorded without `execute_draw`; claim so the status walks
            // through `ended` like any other draw.
            competition = persistence
                .claim_for_draw(request.competition_id)
                .map_err(translate_persistence_error)?;
        }

        let record = NewDrawRecord {
            competition_id: request.competition_id,
            seed_hex: request.seed_hex.clone(),
            algorithm: ALGORITHM.to_string(),
            snapshot_digest: snapshot_digest(&request.snapshot),
            snapshot: request.snapshot.clone(),
            results: request.results.clone(),
            requested_winners: request.requested_winners,
            method: request.method,
            initiated_by,
            notes: compose_notes(request.notes.as_deref(), system_note),
            evidence_url: request.evidence_url.clone(),
            failure,
        };

        let drawn_at = self
            .clock
            .now()
            .format(&Rfc3339)
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to format draw time: {e}"),
            })?;

        persistence
            .record_draw(
                &record,
                competition.winner_count,
                &drawn_at,
                self.clock.unix_now(),
            )
            .map_err(translate_persistence_error)
    }

    /// Claims, draws and records a competition in one pass.
    ///
    /// The claim moves the competition out of the drawable statuses before
    /// the snapshot is read, so a concurrent caller is refused. A snapshot
    /// too small for the primary winners is recorded as a failure record
    /// rather than returned as an error. One that covers the primaries but
    /// not every reserve draws all eligible tickets and notes the shortfall.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An admin-triggered draw has no Admin initiator
    /// - The competition was already drawn or is not drawable
    /// - Storage fails; a competition left `ended` this way can be reopened
    ///   with `reopen_draw`
    pub fn execute_draw(
        &self,
        persistence: &mut Persistence,
        competition_id: i64,
        method: DrawMethod,
        initiator: Option<&AuthenticatedActor>,
        notes: Option<String>,
    ) -> Result<DrawOutcome, ApiError> {
        if method == DrawMethod::Manual {
            return Err(ApiError::InvalidInput {
                field: String::from("method"),
                message: String::from("Manual draws are recorded with create_draw_record"),
            });
        }
        authorize_initiator(method, initiator)?;

        let competition: Competition = persistence
            .claim_for_draw(competition_id)
            .map_err(translate_persistence_error)?;
        let requested = competition.total_winners();
        info!(competition_id, method = %method, requested, "Draw started");

        let snapshot = persistence
            .snapshot_active_tickets(competition_id)
            .map_err(|e| {
                error!(competition_id, error = %e, "Snapshot failed after claim; competition left ended");
                translate_persistence_error(e)
            })?;
        let seed = generate_seed();
        let eligible = snapshot.len();

        // Primaries are met but not every reserve: draw everyone eligible.
        let eligible_count = eligible.to_u32().unwrap_or(u32::MAX);
        let reserves_short = eligible_count > 0
            && eligible_count >= competition.winner_count
            && eligible_count < requested;
        let (to_select, notes) = if reserves_short {
            warn!(competition_id, eligible, requested, "Not enough tickets for every reserve");
            let note = format!(
                "Reserves short: {eligible_count} eligible tickets for {requested} places"
            );
            (eligible_count, compose_notes(notes.as_deref(), Some(note)))
        } else {
            (requested, notes)
        };

        let run = match self.select(competition_id, &seed, snapshot.clone(), to_select) {
            Ok(run) => run,
            Err(err) if err.is_precondition_failure() => {
                warn!(competition_id, eligible, requested, reason = %err, "Draw found no eligible winners");
                DrawRun {
                    competition_id,
                    seed_hex: seed.to_hex(),
                    snapshot,
                    results: Vec::new(),
                    requested_winners: to_select,
                }
            }
            Err(err) => return Err(translate_draw_error(err)),
        };

        let partial = reserves_short || (!run.results.is_empty() && run.is_partial());
        if partial {
            warn!(
                competition_id,
                found = run.results.len(),
                requested,
                "Partial draw: fewer winners than requested"
            );
        }

        let request = CreateDrawRecordRequest {
            competition_id,
            seed_hex: run.seed_hex,
            results: run.results,
            snapshot: run.snapshot,
            requested_winners: to_select,
            method,
            notes,
            evidence_url: None,
        };
        let record = self.create_draw_record(persistence, &request, initiator)?;
        let winners = persistence
            .list_winners(record.draw_id)
            .map_err(translate_persistence_error)?;

        info!(
            competition_id,
            draw_id = record.draw_id,
            winners = winners.len(),
            eligible,
            "Draw finished"
        );

        Ok(DrawOutcome {
            record,
            winners,
            partial,
        })
    }

    /// Draws every automatic competition whose draw time has passed.
    ///
    /// A competition claimed by another runner is skipped; any other
    /// failure is logged and does not stop the remaining draws.
    ///
    /// # Errors
    ///
    /// Returns an error only if the due competitions cannot be listed.
    pub fn run_automatic_draws(
        &self,
        persistence: &mut Persistence,
    ) -> Result<Vec<DrawOutcome>, ApiError> {
        let due = persistence
            .list_due_competitions(self.clock.unix_now())
            .map_err(translate_persistence_error)?;
        if due.is_empty() {
            debug!("No competitions due for an automatic draw");
            return Ok(Vec::new());
        }

        let mut outcomes: Vec<DrawOutcome> = Vec::with_capacity(due.len());
        for competition in due {
            let competition_id = competition.competition_id;
            match self.execute_draw(persistence, competition_id, DrawMethod::Automatic, None, None) {
                Ok(outcome) => outcomes.push(outcome),
                Err(ApiError::AlreadyDrawn { .. } | ApiError::CompetitionNotDrawable { .. }) => {
                    debug!(competition_id, "Competition claimed elsewhere, skipping");
                }
                Err(err) => {
                    error!(competition_id, error = %err, "Automatic draw failed");
                }
            }
        }
        Ok(outcomes)
    }

    /// Replays a stored draw and reports both winner lists.
    ///
    /// # Errors
    ///
    /// Returns `MissingSnapshot` if the record has no stored snapshot, which
    /// is distinct from a replay that disagrees with the record.
    pub fn replay_draw(
        &self,
        persistence: &mut Persistence,
        draw_id: i64,
    ) -> Result<VerifyDrawResponse, ApiError> {
        let record = persistence
            .get_draw(draw_id)
            .map_err(translate_persistence_error)?;
        let outcome = replay_record(&record, self.config.draw_attempt_multiplier()).map_err(
            |err| match err {
                DrawError::MissingSnapshot => {
                    warn!(draw_id, "Draw predates snapshot storage and cannot be replayed");
                    ApiError::MissingSnapshot { draw_id }
                }
                other => translate_draw_error(other),
            },
        )?;

        Ok(VerifyDrawResponse {
            draw_id,
            verified: outcome.matches,
            recorded: outcome.recorded,
            replayed: outcome.replayed,
        })
    }

    /// Whether replaying a stored draw reproduces its winners.
    ///
    /// # Errors
    ///
    /// Returns `MissingSnapshot` if the record cannot be replayed.
    pub fn verify_draw(&self, persistence: &mut Persistence, draw_id: i64) -> Result<bool, ApiError> {
        self.replay_draw(persistence, draw_id).map(|r| r.verified)
    }

    /// Like `verify_draw`, but a mismatch is an error.
    ///
    /// # Errors
    ///
    /// Returns `VerificationMismatch` if replay disagrees with the record.
    pub fn ensure_draw_verified(
        &self,
        persistence: &mut Persistence,
        draw_id: i64,
    ) -> Result<(), ApiError> {
        if self.verify_draw(persistence, draw_id)? {
            Ok(())
        } else {
            Err(ApiError::VerificationMismatch { draw_id })
        }
    }

    /// Returns a `ended` competition to `closed` so it can be drawn again.
    ///
    /// Used when a draw was claimed but never recorded.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyDrawn` if a successful draw exists, or `Unauthorized`
    /// if the actor is not an Admin.
    pub fn reopen_draw(
        &self,
        persistence: &mut Persistence,
        actor: &AuthenticatedActor,
        competition_id: i64,
    ) -> Result<(), ApiError> {
        AuthorizationService::authorize_admin(actor, "reopen_draw")?;
        persistence
            .reopen_for_draw(competition_id)
            .map_err(translate_persistence_error)?;
        info!(competition_id, actor = %actor.id, "Draw reopened");
        Ok(())
    }

    /// Edits the notes or evidence link of a stored draw.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the actor is not an Admin, or
    /// `ResourceNotFound` if the draw does not exist.
    pub fn update_draw_metadata(
        &self,
        persistence: &mut Persistence,
        actor: &AuthenticatedActor,
        draw_id: i64,
        request: &UpdateDrawMetadataRequest,
    ) -> Result<DrawRecord, ApiError> {
        AuthorizationService::authorize_admin(actor, "update_draw_metadata")?;
        persistence
            .update_draw_metadata(
                draw_id,
                request.notes.as_deref(),
                request.evidence_url.as_deref(),
            )
            .map_err(translate_persistence_error)
    }

    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the draw does not exist.
    pub fn get_draw(&self, persistence: &mut Persistence, draw_id: i64) -> Result<DrawRecord, ApiError> {
        persistence
            .get_draw(draw_id)
            .map_err(translate_persistence_error)
    }

    /// Every draw record of a competition, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_draws(
        &self,
        persistence: &mut Persistence,
        competition_id: i64,
    ) -> Result<Vec<DrawRecord>, ApiError> {
        persistence
            .list_draws(competition_id)
            .map_err(translate_persistence_error)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_winners(
        &self,
        persistence: &mut Persistence,
        draw_id: i64,
    ) -> Result<Vec<WinnerRecord>, ApiError> {
        persistence
            .list_winners(draw_id)
            .map_err(translate_persistence_error)
    }

    /// Records that a winner was told.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the winner does not exist.
    pub fn mark_winner_notified(
        &self,
        persistence: &mut Persistence,
        winner_id: i64,
    ) -> Result<WinnerRecord, ApiError> {
        persistence
            .mark_winner_notified(winner_id)
            .map_err(translate_persistence_error)
    }

    /// Claims the prize behind a claim code.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no winner holds the code.
    pub fn claim_prize(
        &self,
        persistence: &mut Persistence,
        claim_code: &str,
    ) -> Result<WinnerRecord, ApiError> {
        persistence
            .mark_winner_claimed(claim_code)
            .map_err(translate_persistence_error)
    }
}

fn authorize_initiator(
    method: DrawMethod,
    initiator: Option<&AuthenticatedActor>,
) -> Result<Option<Actor>, ApiError> {
    match (method, initiator) {
        (DrawMethod::Automatic, actor) => Ok(actor.map(AuthenticatedActor::to_audit_actor)),
        (DrawMethod::AdminTriggered | DrawMethod::Manual, Some(actor)) => {
            AuthorizationService::authorize_admin(actor, "draw")?;
            Ok(Some(actor.to_audit_actor()))
        }
        (DrawMethod::AdminTriggered | DrawMethod::Manual, None) => Err(ApiError::Unauthorized {
            action: String::from("draw"),
            required_role: String::from("Admin"),
        }),
    }
}

/// Why a snapshot cannot yield `requested` winners, if it cannot.
fn failure_reason(snapshot: &[SnapshotEntry], requested: u32) -> Option<DrawFailure> {
    let available = snapshot.len().to_u32().unwrap_or(u32::MAX);
    if available == 0 {
        Some(DrawFailure::NoEligibleTickets)
    } else if requested > available {
        Some(DrawFailure::NotEnoughEligibleTickets {
            requested,
            available,
        })
    } else {
        None
    }
}

fn compose_notes(user: Option<&str>, system: Option<String>) -> Option<String> {
    match (user, system) {
        (Some(user), Some(system)) => Some(format!("{system}\n{user}")),
        (Some(user), None) => Some(user.to_string()),
        (None, system) => system,
    }
}
