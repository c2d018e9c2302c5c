// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Mutations use Diesel DSL and are backend-agnostic, with minimal use of
//! backend-specific helpers (e.g., `last_insert_rowid()` for `SQLite`).
//!
//! ## Module Organization
//!
//! - `competitions` — Competition creation and conditional status changes
//! - `tickets` — The ticket ledger: reservations, promotion, release, sweeps
//! - `draws` — Draw recording and winner bookkeeping
//!
//! Multi-step mutations run through `transaction::with_transaction`.

pub mod competitions;
pub mod draws;
pub mod tickets;

pub use competitions::{
    claim_for_draw_mysql, claim_for_draw_sqlite, create_competition_mysql,
    create_competition_sqlite, reopen_for_draw_mysql, reopen_for_draw_sqlite,
    transition_competition_mysql, transition_competition_sqlite,
};
pub use draws::{
    mark_winner_claimed_mysql, mark_winner_claimed_sqlite, mark_winner_notified_mysql,
    mark_winner_notified_sqlite, record_draw_mysql, record_draw_sqlite,
    update_draw_metadata_mysql, update_draw_metadata_sqlite,
};
pub use tickets::{
    allocate_tickets_mysql, allocate_tickets_sqlite, attach_order_mysql, attach_order_sqlite,
    confirm_order_payment_mysql, confirm_order_payment_sqlite, delete_expired_reservations_mysql,
    delete_expired_reservations_sqlite, delete_stale_reservations_mysql,
    delete_stale_reservations_sqlite, fail_order_payment_mysql, fail_order_payment_sqlite,
    invalidate_ticket_mysql, invalidate_ticket_sqlite, release_reservations_mysql,
    release_reservations_sqlite, retire_order_tickets_mysql, retire_order_tickets_sqlite,
};
