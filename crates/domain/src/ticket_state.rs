// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket lifecycle states and permitted transitions.
//!
//! ```text
//! reserved ──► active ──► winner
//!    │           ├──► cancelled
//!    │           ├──► refunded
//!    │           └──► invalid
//!    ├──► winner
//!    └──► (deleted on release / expiry)
//! ```
//!
//! Expired or released reservations are deleted rather than moved to a
//! state, so there is no `expired` variant.

use crate::error::DomainError;
use crate::types::TicketNumber;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a ticket row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    /// Provisionally held, awaiting payment. Carries an expiry.
    Reserved,
    /// Paid for and eligible for the draw.
    Active,
    /// Selected by a draw.
    Winner,
    /// Order cancelled after payment.
    Cancelled,
    /// Payment returned to the buyer.
    Refunded,
    /// Voided by an administrator.
    Invalid,
}

impl TicketState {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Active => "active",
            Self::Winner => "winner",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Invalid => "invalid",
        }
    }

    /// Terminal states never transition again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Winner | Self::Cancelled | Self::Refunded | Self::Invalid
        )
    }

    /// Whether a ticket in this state still occupies its number.
    ///
    /// Winners keep their number forever; cancelled, refunded and invalid
    /// tickets release it for resale.
    #[must_use]
    pub const fn holds_number(&self) -> bool {
        matches!(self, Self::Reserved | Self::Active | Self::Winner)
    }

    /// Whether a draw may promote a ticket in this state to `winner`.
    #[must_use]
    pub const fn is_draw_eligible(&self) -> bool {
        matches!(self, Self::Reserved | Self::Active)
    }

    /// Validates a transition from this state to `target`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTicketTransition` if the lifecycle forbids it.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        let valid = matches!(
            (self, target),
            (Self::Reserved, Self::Active | Self::Winner)
                | (
                    Self::Active,
                    Self::Winner | Self::Cancelled | Self::Refunded | Self::Invalid
                )
        );

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidTicketTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for TicketState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserved" => Ok(Self::Reserved),
            "active" => Ok(Self::Active),
            "winner" => Ok(Self::Winner),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            "invalid" => Ok(Self::Invalid),
            _ => Err(DomainError::InvalidTicketState(s.to_string())),
        }
    }
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ticket row as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: i64,
    pub competition_id: i64,
    pub ticket_number: TicketNumber,
    pub owner_id: Option<i64>,
    pub order_id: Option<i64>,
    pub state: TicketState,
    /// Unix seconds; set while the row is or was a reservation.
    pub reserved_at: Option<i64>,
    /// Unix seconds; only meaningful while `state` is `Reserved`.
    pub expires_at: Option<i64>,
}

impl Ticket {
    /// Whether the row still holds its number at `now`.
    ///
    /// A reservation past its expiry counts as absent even before the
    /// sweep deletes it.
    #[must_use]
    pub fn is_live_at(&self, now: i64) -> bool {
        match self.state {
            TicketState::Reserved => self.expires_at.is_some_and(|at| at > now),
            other => other.holds_number(),
        }
    }
}
