// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation manager.
//!
//! Turns a buyer's request into held numbers, binds holds to orders, and
//! promotes or releases them as payments settle. Exclusivity comes from
//! the ledger's uniqueness constraint; this layer only chooses numbers and
//! retries lucky draws that lose a race.

use std::collections::BTreeSet;
use std::sync::Arc;

use num_traits::ToPrimitive;
use tracing::{debug, info, warn};

use ticket_draw::{Clock, select_lucky_numbers};
use ticket_draw_domain::{Competition, Ticket, TicketNumber, TicketSelection, validate_picked_numbers};
use ticket_draw_persistence::{Persistence, PersistenceError};

use crate::config::ServiceConfig;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AttachOrderRequest, HoldTicketsRequest, HoldTicketsResponse, SweepReport,
};

/// Holds, releases and settles ticket reservations.
pub struct ReservationManager {
    config: ServiceConfig,
    clock: Arc<dyn Clock>,
}

impl ReservationManager {
    #[must_use]
    pub const fn new(config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Holds tickets for a buyer until the reservation TTL elapses.
    ///
    /// Lucky-draw requests pick free numbers at random and retry with a
    /// fresh pick when another buyer takes one of them first. Picked-number
    /// requests are all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The competition does not exist or is not `live`
    /// - A picked number is invalid, repeated or beyond the ticket limit
    /// - Any picked number is taken (`Conflict` names every taken number)
    /// - Fewer free numbers remain than were requested
    /// - Every lucky-draw attempt lost its race
    pub fn hold_tickets(
        &self,
        persistence: &mut Persistence,
        request: &HoldTicketsRequest,
    ) -> Result<HoldTicketsResponse, ApiError> {
        let competition: Competition = persistence
            .get_competition(request.competition_id)
            .map_err(translate_persistence_error)?;
        if !competition.status.accepts_entries() {
            return Err(ApiError::NotAcceptingEntries {
                competition_id: competition.competition_id,
                status: competition.status,
            });
        }

        let now = self.clock.unix_now();
        let expires_at = now + self.config.reservation_ttl().whole_seconds();

        let tickets: Vec<Ticket> = match &request.selection {
            TicketSelection::NumberPicker { numbers } => {
                let picked = validate_picked_numbers(numbers, competition.ticket_limit)
                    .map_err(translate_domain_error)?;
                self.allocate(persistence, &competition, &picked, request.owner_id, now, expires_at)?
            }
            TicketSelection::LuckyDraw { quantity } => self.hold_lucky_numbers(
                persistence,
                &competition,
                *quantity,
                request.owner_id,
                now,
                expires_at,
            )?,
        };

        let numbers: Vec<TicketNumber> = tickets.iter().map(|t| t.ticket_number).collect();
        info!(
            competition_id = competition.competition_id,
            owner_id = request.owner_id,
            ticket_count = numbers.len(),
            expires_at,
            "Tickets held"
        );

        Ok(HoldTicketsResponse {
            competition_id: competition.competition_id,
            numbers,
            expires_at,
        })
    }

    fn hold_lucky_numbers(
        &self,
        persistence: &mut Persistence,
        competition: &Competition,
        quantity: u32,
        owner_id: i64,
        now: i64,
        expires_at: i64,
    ) -> Result<Vec<Ticket>, ApiError> {
        let bound = competition.number_bound(self.config.unlimited_number_bound());
        let retries = self.config.allocation_retries();
        let mut last_conflict: Vec<TicketNumber> = Vec::new();

        for attempt in 1..=retries {
            let taken: BTreeSet<TicketNumber> = persistence
                .taken_numbers(competition.competition_id, now)
                .map_err(translate_persistence_error)?;
            let picked = select_lucky_numbers(&taken, bound, quantity).map_err(translate_core_error)?;

            match self.allocate(persistence, competition, &picked, owner_id, now, expires_at) {
                Ok(tickets) => return Ok(tickets),
                Err(ApiError::Conflict { numbers }) => {
                    debug!(
                        competition_id = competition.competition_id,
                        attempt,
                        conflicts = numbers.len(),
                        "Lucky draw lost a race, picking again"
                    );
                    last_conflict = numbers;
                }
                Err(err) => return Err(err),
            }
        }

        warn!(
            competition_id = competition.competition_id,
            retries, "Lucky draw allocation exhausted its retries"
        );
        Err(ApiError::Conflict {
            numbers: last_conflict,
        })
    }

    fn allocate(
        &self,
        persistence: &mut Persistence,
        competition: &Competition,
        numbers: &[TicketNumber],
        owner_id: i64,
        now: i64,
        expires_at: i64,
    ) -> Result<Vec<Ticket>, ApiError> {
        debug!(
            competition_id = competition.competition_id,
            owner_id,
            ticket_count = numbers.len(),
            "Allocating tickets"
        );
        persistence
            .allocate_tickets(competition.competition_id, numbers, owner_id, now, expires_at)
            .map_err(|err| {
                if let PersistenceError::TicketConflict { numbers } = &err {
                    info!(
                        competition_id = competition.competition_id,
                        owner_id,
                        taken = ?numbers,
                        "Ticket conflict"
                    );
                }
                translate_persistence_error(err)
            })
    }

    /// Releases numbers from a buyer's cart.
    ///
    /// Only the buyer's own holds that are not yet part of an order are
    /// touched; anything else in `numbers` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn release_tickets(
        &self,
        persistence: &mut Persistence,
        competition_id: i64,
        owner_id: i64,
        numbers: &[TicketNumber],
    ) -> Result<usize, ApiError> {
        let released = persistence
            .release_reservations(competition_id, owner_id, numbers)
            .map_err(translate_persistence_error)?;
        debug!(competition_id, owner_id, released, "Tickets released");
        Ok(released)
    }

    /// Binds a buyer's holds to a placed order and restarts their TTL.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` naming any number the buyer no longer holds.
    pub fn attach_order(
        &self,
        persistence: &mut Persistence,
        request: &AttachOrderRequest,
    ) -> Result<Vec<Ticket>, ApiError> {
        let now = self.clock.unix_now();
        let hold_until = now + self.config.reservation_ttl().whole_seconds();
        persistence
            .attach_order(
                request.competition_id,
                request.owner_id,
                &request.numbers,
                request.order_id,
                hold_until,
                now,
            )
            .map_err(translate_persistence_error)
    }

    /// Promotes an order's holds to `active` after payment.
    ///
    /// Confirming the same order twice promotes nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn confirm_payment(
        &self,
        persistence: &mut Persistence,
        order_id: i64,
    ) -> Result<Vec<Ticket>, ApiError> {
        persistence
            .confirm_order_payment(order_id)
            .map_err(translate_persistence_error)
    }

    /// Releases an order's holds after a failed payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn fail_payment(&self, persistence: &mut Persistence, order_id: i64) -> Result<usize, ApiError> {
        let released = persistence
            .fail_order_payment(order_id)
            .map_err(translate_persistence_error)?;
        info!(order_id, released, "Payment failed, holds released");
        Ok(released)
    }

    /// Cancels an order's active tickets, freeing their numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn cancel_order(
        &self,
        persistence: &mut Persistence,
        order_id: i64,
    ) -> Result<Vec<Ticket>, ApiError> {
        persistence
            .cancel_order_tickets(order_id)
            .map_err(translate_persistence_error)
    }

    /// Refunds an order's active tickets, freeing their numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn refund_order(
        &self,
        persistence: &mut Persistence,
        order_id: i64,
    ) -> Result<Vec<Ticket>, ApiError> {
        persistence
            .refund_order_tickets(order_id)
            .map_err(translate_persistence_error)
    }

    /// Marks an active ticket invalid, freeing its number.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket does not exist or is not `active`.
    pub fn invalidate_ticket(
        &self,
        persistence: &mut Persistence,
        ticket_id: i64,
    ) -> Result<Ticket, ApiError> {
        persistence
            .invalidate_ticket(ticket_id)
            .map_err(translate_persistence_error)
    }

    /// A buyer's live tickets in a competition.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_owner_tickets(
        &self,
        persistence: &mut Persistence,
        competition_id: i64,
        owner_id: i64,
    ) -> Result<Vec<Ticket>, ApiError> {
        persistence
            .list_owner_tickets(competition_id, owner_id, self.clock.unix_now())
            .map_err(translate_persistence_error)
    }

    /// How many numbers are free to hold right now.
    ///
    /// Expired holds count as free.
    ///
    /// # Errors
    ///
    /// Returns an error if the competition does not exist.
    pub fn count_available(
        &self,
        persistence: &mut Persistence,
        competition_id: i64,
    ) -> Result<u32, ApiError> {
        let competition = persistence
            .get_competition(competition_id)
            .map_err(translate_persistence_error)?;
        let bound = competition.number_bound(self.config.unlimited_number_bound());
        let taken = persistence
            .taken_numbers(competition_id, self.clock.unix_now())
            .map_err(translate_persistence_error)?;
        let in_range = taken.iter().filter(|n| n.value() <= bound).count();
        Ok(bound.saturating_sub(in_range.to_u32().unwrap_or(u32::MAX)))
    }

    /// Deletes expired holds, then any hold older than the safety-net age.
    ///
    /// # Errors
    ///
    /// Returns an error if a delete fails.
    pub fn sweep_reservations(&self, persistence: &mut Persistence) -> Result<SweepReport, ApiError> {
        let now = self.clock.unix_now();
        let expired = persistence
            .delete_expired_reservations(now)
            .map_err(translate_persistence_error)?;
        let cutoff = now - self.config.stale_reservation_max_age().whole_seconds();
        let stale = persistence
            .delete_stale_reservations(cutoff)
            .map_err(translate_persistence_error)?;

        let report = SweepReport { expired, stale };
        if report.total() > 0 {
            info!(expired, stale, "Reservation sweep removed holds");
        } else {
            debug!("Reservation sweep found nothing to remove");
        }
        Ok(report)
    }
}
