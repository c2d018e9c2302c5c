// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic query modules.
//!
//! ## Module Organization
//!
//! - `competitions` — Competition lookup and the automatic-draw schedule
//! - `tickets` — Ledger reads: taken numbers, owner and order views, draw snapshots
//! - `draws` — Draw records and winners

pub mod competitions;
pub mod draws;
pub mod tickets;

pub use competitions::{
    get_competition_mysql, get_competition_sqlite, list_due_competitions_mysql,
    list_due_competitions_sqlite,
};
pub use draws::{
    get_draw_mysql, get_draw_sqlite, get_winner_by_claim_code_mysql,
    get_winner_by_claim_code_sqlite, has_successful_draw_mysql, has_successful_draw_sqlite,
    list_draws_mysql, list_draws_sqlite, list_winners_mysql, list_winners_sqlite,
};
pub use tickets::{
    get_ticket_mysql, get_ticket_sqlite, list_order_tickets_mysql, list_order_tickets_sqlite,
    list_owner_tickets_mysql, list_owner_tickets_sqlite, snapshot_active_tickets_mysql,
    snapshot_active_tickets_sqlite, taken_numbers_mysql, taken_numbers_sqlite,
};
