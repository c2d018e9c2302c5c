// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;
use ticket_draw_domain::DomainError;

/// Errors raised while allocating numbers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// Fewer free numbers remain than were requested.
    #[error("Only {available} tickets remain but {requested} were requested")]
    InsufficientInventory { requested: u32, available: u32 },
}

/// Errors raised by winner selection and replay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("Cannot draw from an empty snapshot")]
    EmptySnapshot,
    #[error("Requested {requested} winners from a snapshot of {available} tickets")]
    OversizedRequest { requested: u32, available: u32 },
    #[error("At least one winner must be requested")]
    InvalidWinnerCount,
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
    #[error("Unsupported draw algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Draw record has no stored snapshot")]
    MissingSnapshot,
}

impl DrawError {
    /// Whether the error is a violated draw precondition (as opposed to a
    /// malformed input).
    #[must_use]
    pub const fn is_precondition_failure(&self) -> bool {
        matches!(self, Self::EmptySnapshot | Self::OversizedRequest { .. })
    }
}
