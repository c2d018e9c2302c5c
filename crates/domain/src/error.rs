// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::TicketNumber;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Ticket numbers are positive integers.
    InvalidTicketNumber(i64),
    /// A picked number lies beyond the competition's ticket limit.
    TicketNumberOutOfRange {
        /// The offending number.
        number: TicketNumber,
        /// The competition's ticket limit.
        limit: u32,
    },
    /// The same number was requested more than once in one request.
    DuplicateTicketNumber(TicketNumber),
    /// A request asked for zero tickets.
    EmptyTicketRequest,
    /// Unknown ticket state string.
    InvalidTicketState(String),
    /// Unknown competition status string.
    InvalidCompetitionStatus(String),
    /// Unknown draw mode string.
    InvalidDrawMode(String),
    /// Unknown draw initiation method string.
    InvalidDrawMethod(String),
    /// A ticket lifecycle transition is not permitted.
    InvalidTicketTransition {
        /// The current state.
        from: String,
        /// The requested state.
        to: String,
    },
    /// A competition status transition is not permitted.
    InvalidCompetitionTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Primary winner count must be positive.
    InvalidWinnerCount(u32),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTicketNumber(value) => {
                write!(f, "Invalid ticket number {value}: must be a positive integer")
            }
            Self::TicketNumberOutOfRange { number, limit } => {
                write!(f, "Ticket number {number} exceeds the ticket limit of {limit}")
            }
            Self::DuplicateTicketNumber(number) => {
                write!(f, "Ticket number {number} was requested more than once")
            }
            Self::EmptyTicketRequest => write!(f, "At least one ticket must be requested"),
            Self::InvalidTicketState(state) => write!(f, "Invalid ticket state: {state}"),
            Self::InvalidCompetitionStatus(status) => {
                write!(f, "Invalid competition status: {status}")
            }
            Self::InvalidDrawMode(mode) => write!(f, "Invalid draw mode: {mode}"),
            Self::InvalidDrawMethod(method) => write!(f, "Invalid draw method: {method}"),
            Self::InvalidTicketTransition { from, to } => {
                write!(f, "Ticket cannot transition from '{from}' to '{to}'")
            }
            Self::InvalidCompetitionTransition { from, to } => {
                write!(f, "Competition cannot transition from '{from}' to '{to}'")
            }
            Self::InvalidWinnerCount(count) => {
                write!(f, "Invalid winner count {count}: at least one winner is required")
            }
        }
    }
}

impl std::error::Error for DomainError {}
