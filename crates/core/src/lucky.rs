// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

use ticket_draw_domain::{DomainError, TicketNumber};

use crate::error::CoreError;

/// Chooses `quantity` free numbers from `1..=bound` uniformly at random.
///
/// Candidates are every number in range that is not in `taken`; a
/// Fisher–Yates pass over the first `quantity` slots picks the winners,
/// which are returned ascending.
///
/// # Errors
///
/// Returns an error if:
/// - `quantity` is zero
/// - Fewer than `quantity` numbers are free
pub fn select_lucky_numbers(
    taken: &BTreeSet<TicketNumber>,
    bound: u32,
    quantity: u32,
) -> Result<Vec<TicketNumber>, CoreError> {
    if quantity == 0 {
        return Err(DomainError::EmptyTicketRequest.into());
    }

    let mut candidates: Vec<TicketNumber> = (1..=bound)
        .filter_map(|n| TicketNumber::new(i64::from(n)).ok())
        .filter(|n| !taken.contains(n))
        .collect();

    let wanted = quantity as usize;
    if candidates.len() < wanted {
        return Err(CoreError::InsufficientInventory {
            requested: quantity,
            available: u32::try_from(candidates.len()).unwrap_or(u32::MAX),
        });
    }

    partial_shuffle(&mut candidates, wanted);
    candidates.truncate(wanted);
    candidates.sort_unstable();
    Ok(candidates)
}

/// Fisher–Yates, stopped after the first `count` positions are fixed.
fn partial_shuffle<T>(items: &mut [T], count: usize) {
    let len = items.len();
    for i in 0..count.min(len) {
        let j: usize = rand::random_range(i..len);
        items.swap(i, j);
    }
}
