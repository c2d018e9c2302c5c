// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Arc;

use ticket_draw::ManualClock;
use ticket_draw_domain::{DrawMode, TicketNumber, TicketSelection};
use ticket_draw_persistence::{NewCompetition, Persistence};

use crate::{
    AttachOrderRequest, AuthenticatedActor, DrawService, HoldTicketsRequest, ReservationManager,
    Role, ServiceConfig,
};

/// Clock reading every test starts from.
pub const NOW: i64 = 1_700_000_000;

/// Services sharing one manual clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub reservations: ReservationManager,
    pub draws: DrawService,
    pub persistence: Persistence,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let clock = Arc::new(ManualClock::new(NOW));
        Self {
            reservations: ReservationManager::new(config.clone(), clock.clone()),
            draws: DrawService::new(config, clock.clone()),
            clock,
            persistence: Persistence::new_in_memory().unwrap(),
        }
    }

    /// Opens a competition drawn one hour from `NOW`.
    pub fn create_competition(
        &mut self,
        ticket_limit: Option<u32>,
        winner_count: u32,
        reserve_count: u32,
        draw_mode: DrawMode,
    ) -> i64 {
        self.persistence
            .create_competition(
                &NewCompetition {
                    title: String::from("Test Raffle"),
                    ticket_limit,
                    draw_at: NOW + 3_600,
                    draw_mode,
                    winner_count,
                    reserve_count,
                },
                NOW,
            )
            .unwrap()
    }

    /// Holds, orders and pays for `values`, leaving them `active`.
    pub fn buy(&mut self, competition_id: i64, owner_id: i64, order_id: i64, values: &[i64]) {
        let held = self
            .reservations
            .hold_tickets(
                &mut self.persistence,
                &HoldTicketsRequest {
                    competition_id,
                    owner_id,
                    selection: pick(values),
                },
            )
            .unwrap();
        self.reservations
            .attach_order(
                &mut self.persistence,
                &AttachOrderRequest {
                    competition_id,
                    owner_id,
                    numbers: held.numbers,
                    order_id,
                },
            )
            .unwrap();
        self.reservations
            .confirm_payment(&mut self.persistence, order_id)
            .unwrap();
    }
}

pub fn numbers(values: &[i64]) -> Vec<TicketNumber> {
    values
        .iter()
        .map(|&v| TicketNumber::new(v).unwrap())
        .collect()
}

pub fn pick(values: &[i64]) -> TicketSelection {
    TicketSelection::NumberPicker {
        numbers: numbers(values),
    }
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_operator() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("operator-456"), Role::Operator)
}
