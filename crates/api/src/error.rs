// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the service boundary.

use ticket_draw::{CoreError, DrawError};
use ticket_draw_audit::DrawFailure;
use ticket_draw_domain::{CompetitionStatus, DomainError, TicketNumber};
use ticket_draw_persistence::PersistenceError;

/// Authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The actor's role does not permit the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Service-level errors.
///
/// These are distinct from the storage and engine errors and represent the
/// contract offered to the web, payment and scheduler layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Requested numbers are held by someone else. Retry with other numbers.
    Conflict {
        /// Every conflicting number, ascending.
        numbers: Vec<TicketNumber>,
    },
    /// Fewer free numbers remain than were requested.
    InsufficientInventory {
        /// Tickets requested.
        requested: u32,
        /// Tickets still available.
        available: u32,
    },
    /// The draw snapshot held no eligible tickets.
    EmptySnapshot,
    /// More winners were requested than tickets were eligible.
    OversizedRequest {
        /// Winners requested.
        requested: u32,
        /// Eligible tickets.
        available: u32,
    },
    /// A successful draw already exists for the competition.
    AlreadyDrawn {
        /// The competition.
        competition_id: i64,
    },
    /// The competition is not in a status a draw can start from.
    CompetitionNotDrawable {
        /// The competition.
        competition_id: i64,
        /// Its current status.
        status: CompetitionStatus,
    },
    /// The competition does not accept new reservations.
    NotAcceptingEntries {
        /// The competition.
        competition_id: i64,
        /// Its current status.
        status: CompetitionStatus,
    },
    /// The draw record predates snapshot storage and cannot be replayed.
    MissingSnapshot {
        /// The draw record.
        draw_id: i64,
    },
    /// Replaying the draw did not reproduce its stored winners.
    VerificationMismatch {
        /// The draw record.
        draw_id: i64,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

fn join_numbers(numbers: &[TicketNumber]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { numbers } => {
                write!(f, "Ticket numbers already taken: {}", join_numbers(numbers))
            }
            Self::InsufficientInventory {
                requested,
                available,
            } => write!(
                f,
                "Insufficient inventory: {requested} requested, {available} available"
            ),
            Self::EmptySnapshot => write!(f, "Draw snapshot is empty"),
            Self::OversizedRequest {
                requested,
                available,
            } => write!(
                f,
                "Draw requested {requested} winners from {available} eligible tickets"
            ),
            Self::AlreadyDrawn { competition_id } => {
                write!(f, "Competition {competition_id} has already been drawn")
            }
            Self::CompetitionNotDrawable {
                competition_id,
                status,
            } => write!(
                f,
                "Competition {competition_id} is {status} and cannot be drawn"
            ),
            Self::NotAcceptingEntries {
                competition_id,
                status,
            } => write!(
                f,
                "Competition {competition_id} is {status} and not accepting entries"
            ),
            Self::MissingSnapshot { draw_id } => {
                write!(f, "Draw {draw_id} has no stored snapshot and cannot be verified")
            }
            Self::VerificationMismatch { draw_id } => {
                write!(f, "Draw {draw_id} failed verification: replay does not match the record")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Wording safe to show to buyers.
    ///
    /// Conflicts name the taken numbers and shortfalls name what remains.
    /// Draw failures use one generic message and never describe the
    /// snapshot.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Conflict { numbers } => format!(
                "Sorry, these numbers are already taken: {}. Please choose different numbers.",
                join_numbers(numbers)
            ),
            Self::InsufficientInventory { available, .. } => match *available {
                0 => String::from("Sorry, this competition has sold out."),
                1 => String::from("Sorry, only 1 ticket remains."),
                n => format!("Sorry, only {n} tickets remain."),
            },
            Self::EmptySnapshot | Self::OversizedRequest { .. } => {
                DrawFailure::NoEligibleTickets.user_message().to_string()
            }
            Self::AlreadyDrawn { .. } => String::from("This competition has already been drawn."),
            Self::CompetitionNotDrawable { .. } | Self::NotAcceptingEntries { .. } => {
                String::from("This competition is not accepting entries.")
            }
            Self::Internal { .. } => String::from("Something went wrong. Please try again."),
            other => other.to_string(),
        }
    }

    /// Whether the caller may retry the same request with different numbers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidTicketNumber(_)
        | DomainError::TicketNumberOutOfRange { .. }
        | DomainError::DuplicateTicketNumber(_)
        | DomainError::EmptyTicketRequest => ApiError::InvalidInput {
            field: String::from("numbers"),
            message: err.to_string(),
        },
        DomainError::InvalidWinnerCount(_) => ApiError::InvalidInput {
            field: String::from("winner_count"),
            message: err.to_string(),
        },
        DomainError::InvalidTicketTransition { .. } => ApiError::DomainRuleViolation {
            rule: String::from("ticket_lifecycle"),
            message: err.to_string(),
        },
        DomainError::InvalidCompetitionTransition { .. } => ApiError::DomainRuleViolation {
            rule: String::from("competition_lifecycle"),
            message: err.to_string(),
        },
        DomainError::InvalidTicketState(_)
        | DomainError::InvalidCompetitionStatus(_)
        | DomainError::InvalidDrawMode(_)
        | DomainError::InvalidDrawMethod(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core allocation error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InsufficientInventory {
            requested,
            available,
        } => ApiError::InsufficientInventory {
            requested,
            available,
        },
    }
}

/// Translates a winner-selection error into an API error.
///
/// `MissingSnapshot` only arises during verification, where the caller
/// knows the draw ID and reports it directly.
#[must_use]
pub fn translate_draw_error(err: DrawError) -> ApiError {
    match err {
        DrawError::EmptySnapshot => ApiError::EmptySnapshot,
        DrawError::OversizedRequest {
            requested,
            available,
        } => ApiError::OversizedRequest {
            requested,
            available,
        },
        DrawError::InvalidWinnerCount => ApiError::InvalidInput {
            field: String::from("winner_count"),
            message: err.to_string(),
        },
        DrawError::InvalidSeed(_) => ApiError::InvalidInput {
            field: String::from("seed"),
            message: err.to_string(),
        },
        DrawError::UnsupportedAlgorithm(_) | DrawError::MissingSnapshot => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a storage error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::TicketConflict { numbers } => ApiError::Conflict { numbers },
        PersistenceError::NotAcceptingEntries {
            competition_id,
            status,
        } => ApiError::NotAcceptingEntries {
            competition_id,
            status,
        },
        PersistenceError::AlreadyDrawn { competition_id } => {
            ApiError::AlreadyDrawn { competition_id }
        }
        PersistenceError::CompetitionNotDrawable {
            competition_id,
            status,
        } => ApiError::CompetitionNotDrawable {
            competition_id,
            status,
        },
        PersistenceError::CompetitionNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Competition"),
            message: format!("Competition {id} does not exist"),
        },
        PersistenceError::DrawNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Draw"),
            message: format!("Draw {id} does not exist"),
        },
        PersistenceError::WinnerNotFound(key) => ApiError::ResourceNotFound {
            resource_type: String::from("Winner"),
            message: format!("No winner matches '{key}'"),
        },
        PersistenceError::TicketNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Ticket"),
            message: format!("Ticket {id} does not exist"),
        },
        PersistenceError::ReservationNotFound { numbers } => ApiError::ResourceNotFound {
            resource_type: String::from("Reservation"),
            message: format!("No live reservation for numbers: {}", join_numbers(&numbers)),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        PersistenceError::InvalidDrawRecord(msg) => ApiError::InvalidInput {
            field: String::from("draw_record"),
            message: msg,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
