// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

use crate::error::DomainError;
use crate::types::TicketNumber;

/// Validates a number-picker request against a competition's ticket limit.
///
/// Returns the numbers sorted ascending.
///
/// # Errors
///
/// Returns an error if:
/// - No numbers were requested
/// - A number appears twice
/// - A number exceeds the ticket limit
pub fn validate_picked_numbers(
    numbers: &[TicketNumber],
    ticket_limit: Option<u32>,
) -> Result<Vec<TicketNumber>, DomainError> {
    if numbers.is_empty() {
        return Err(DomainError::EmptyTicketRequest);
    }

    let mut seen: BTreeSet<TicketNumber> = BTreeSet::new();
    for number in numbers {
        if !seen.insert(*number) {
            return Err(DomainError::DuplicateTicketNumber(*number));
        }
        if let Some(limit) = ticket_limit
            && number.value() > limit
        {
            return Err(DomainError::TicketNumberOutOfRange {
                number: *number,
                limit,
            });
        }
    }

    Ok(seen.into_iter().collect())
}

/// Validates the primary winner count of a competition.
///
/// # Errors
///
/// Returns `DomainError::InvalidWinnerCount` if `winner_count` is zero.
pub const fn validate_winner_count(winner_count: u32) -> Result<(), DomainError> {
    if winner_count == 0 {
        return Err(DomainError::InvalidWinnerCount(winner_count));
    }
    Ok(())
}
