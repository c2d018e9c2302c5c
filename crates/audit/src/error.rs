// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;
use ticket_draw_domain::TicketNumber;

/// Violations of draw record integrity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("Winner ticket {0} does not appear in the draw snapshot")]
    WinnerNotInSnapshot(TicketNumber),
    #[error("Ticket {0} appears more than once in the winner list")]
    DuplicateWinner(TicketNumber),
    #[error("Ticket {0} appears more than once in the snapshot")]
    DuplicateSnapshotEntry(TicketNumber),
    #[error("Snapshot is not ordered by ticket number at position {position}")]
    UnorderedSnapshot { position: usize },
    #[error("Winner positions must run 1..=n, found {found} at index {index}")]
    InvalidPosition { index: usize, found: u32 },
    #[error("A failed draw cannot carry winners")]
    FailureWithWinners,
    #[error("Draw produced {found} winners but only {requested} were requested")]
    TooManyWinners { requested: u32, found: usize },
    #[error("Unknown winner status: {0}")]
    InvalidWinnerStatus(String),
}
