// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod competition;
mod error;
mod ticket_state;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use competition::{Competition, CompetitionStatus, DrawMode};
pub use error::DomainError;
pub use ticket_state::{Ticket, TicketState};
pub use types::{DrawMethod, TicketNumber, TicketSelection};
pub use validation::{validate_picked_numbers, validate_winner_count};
