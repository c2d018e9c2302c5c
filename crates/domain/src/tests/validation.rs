// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::numbers;
use crate::{DomainError, validate_picked_numbers, validate_winner_count};

#[test]
fn test_picked_numbers_are_sorted() {
    let result = validate_picked_numbers(&numbers(&[9, 2, 5]), Some(10)).expect("valid");
    assert_eq!(result, numbers(&[2, 5, 9]));
}

#[test]
fn test_picked_numbers_reject_duplicates() {
    let result = validate_picked_numbers(&numbers(&[3, 3]), None);
    assert!(matches!(result, Err(DomainError::DuplicateTicketNumber(n)) if n.value() == 3));
}

#[test]
fn test_picked_numbers_respect_limit() {
    let result = validate_picked_numbers(&numbers(&[10, 11]), Some(10));
    assert!(matches!(
        result,
        Err(DomainError::TicketNumberOutOfRange { limit: 10, .. })
    ));
}

#[test]
fn test_picked_numbers_unlimited() {
    assert!(validate_picked_numbers(&numbers(&[1_000_000]), None).is_ok());
}

#[test]
fn test_empty_request_rejected() {
    assert_eq!(
        validate_picked_numbers(&[], Some(10)),
        Err(DomainError::EmptyTicketRequest)
    );
}

#[test]
fn test_winner_count() {
    assert!(validate_winner_count(0).is_err());
    assert!(validate_winner_count(1).is_ok());
}
