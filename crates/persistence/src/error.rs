// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ticket_draw_audit::AuditError;
use ticket_draw_domain::{CompetitionStatus, DomainError, TicketNumber};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored value failed domain validation.
    ReconstructionError(String),
    /// The requested competition does not exist.
    CompetitionNotFound(i64),
    /// The requested draw record does not exist.
    DrawNotFound(i64),
    /// The requested winner does not exist.
    WinnerNotFound(String),
    /// The requested ticket does not exist.
    TicketNotFound(i64),
    /// One or more requested numbers are already held.
    ///
    /// `numbers` names every conflicting number, ascending.
    TicketConflict { numbers: Vec<TicketNumber> },
    /// The competition does not accept new reservations.
    NotAcceptingEntries {
        competition_id: i64,
        status: CompetitionStatus,
    },
    /// A reservation named by the caller does not exist or has expired.
    ReservationNotFound { numbers: Vec<TicketNumber> },
    /// A successful draw already exists for the competition.
    AlreadyDrawn { competition_id: i64 },
    /// The competition is not in a status a draw may be claimed from.
    CompetitionNotDrawable {
        competition_id: i64,
        status: CompetitionStatus,
    },
    /// A draw record failed its consistency checks before storage.
    InvalidDrawRecord(String),
    /// A winning ticket was no longer eligible when the record was stored.
    TicketNotEligible { ticket_id: i64 },
    /// A ticket or competition transition was rejected by the domain rules.
    DomainViolation(DomainError),
    /// The requested resource was not found.
    NotFound(String),
    /// A general error occurred.
    Other(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::ReconstructionError(msg) => write!(f, "Stored value is invalid: {msg}"),
            Self::CompetitionNotFound(id) => write!(f, "Competition not found: {id}"),
            Self::DrawNotFound(id) => write!(f, "Draw not found: {id}"),
            Self::WinnerNotFound(msg) => write!(f, "Winner not found: {msg}"),
            Self::TicketNotFound(id) => write!(f, "Ticket not found: {id}"),
            Self::TicketConflict { numbers } => {
                let list: Vec<String> = numbers.iter().map(ToString::to_string).collect();
                write!(f, "Ticket numbers already taken: {}", list.join(", "))
            }
            Self::NotAcceptingEntries {
                competition_id,
                status,
            } => write!(
                f,
                "Competition {competition_id} is {status} and not accepting entries"
            ),
            Self::ReservationNotFound { numbers } => {
                let list: Vec<String> = numbers.iter().map(ToString::to_string).collect();
                write!(f, "No live reservation for numbers: {}", list.join(", "))
            }
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
            Self::InvalidDrawRecord(msg) => write!(f, "Invalid draw record: {msg}"),
            Self::TicketNotEligible { ticket_id } => {
                write!(f, "Ticket {ticket_id} is no longer eligible to win")
            }
            Self::DomainViolation(err) => write!(f, "Domain rule violated: {err}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<AuditError> for PersistenceError {
    fn from(err: AuditError) -> Self {
        Self::InvalidDrawRecord(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

/// Whether a Diesel error is a unique-constraint violation.
pub(crate) const fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}
