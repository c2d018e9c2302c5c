// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;

use ticket_draw_domain::{CompetitionStatus, DrawMode, TicketSelection, TicketState};

use super::helpers::{Harness, NOW, numbers, pick};
use crate::{ApiError, AttachOrderRequest, HoldTicketsRequest, ServiceConfig};

fn hold(
    harness: &mut Harness,
    competition_id: i64,
    owner_id: i64,
    selection: TicketSelection,
) -> Result<Vec<i64>, ApiError> {
    harness
        .reservations
        .hold_tickets(
            &mut harness.persistence,
            &HoldTicketsRequest {
                competition_id,
                owner_id,
                selection,
            },
        )
        .map(|r| r.numbers.iter().map(|n| n.as_i64()).collect())
}

#[test]
fn test_picked_numbers_are_held_until_ttl() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(50), 1, 0, DrawMode::Automatic);

    let response = harness
        .reservations
        .hold_tickets(
            &mut harness.persistence,
            &HoldTicketsRequest {
                competition_id,
                owner_id: 1,
                selection: pick(&[9, 3]),
            },
        )
        .unwrap();

    assert_eq!(response.numbers, numbers(&[3, 9]));
    assert_eq!(response.expires_at, NOW + 15 * 60);
}

#[test]
fn test_picked_conflict_names_every_taken_number() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(50), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[4, 6])).unwrap();

    let err = hold(&mut harness, competition_id, 2, pick(&[3, 4, 5, 6])).unwrap_err();
    assert_eq!(
        err,
        ApiError::Conflict {
            numbers: numbers(&[4, 6])
        }
    );
    assert!(err.is_retryable());
    assert!(err.user_message().contains("4, 6"));
}

#[test]
fn test_picked_number_beyond_limit_rejected() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);

    let err = hold(&mut harness, competition_id, 1, pick(&[11])).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "numbers"));
}

#[test]
fn test_duplicate_picked_number_rejected() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);

    let err = hold(&mut harness, competition_id, 1, pick(&[2, 2])).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_lucky_draw_holds_requested_quantity_within_limit() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(20), 1, 0, DrawMode::Automatic);

    let held = hold(
        &mut harness,
        competition_id,
        1,
        TicketSelection::LuckyDraw { quantity: 5 },
    )
    .unwrap();

    assert_eq!(held.len(), 5);
    assert!(held.windows(2).all(|w| w[0] < w[1]));
    assert!(held.iter().all(|n| (1..=20).contains(n)));
}

#[test]
fn test_lucky_draw_on_unlimited_competition_uses_configured_bound() {
    let config = ServiceConfig::new(
        Duration::minutes(15),
        Duration::minutes(60),
        5,
        3,
        100,
    )
    .unwrap();
    let mut harness = Harness::with_config(config);
    let competition_id = harness.create_competition(None, 1, 0, DrawMode::Automatic);

    let held = hold(
        &mut harness,
        competition_id,
        1,
        TicketSelection::LuckyDraw { quantity: 5 },
    )
    .unwrap();
    assert_eq!(held, vec![1, 2, 3, 4, 5]);

    let err = hold(
        &mut harness,
        competition_id,
        2,
        TicketSelection::LuckyDraw { quantity: 1 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::InsufficientInventory {
            requested: 1,
            available: 0
        }
    );
}

#[test]
fn test_closed_competition_refuses_holds() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    harness.persistence.close_competition(competition_id).unwrap();

    let err = hold(&mut harness, competition_id, 1, pick(&[1])).unwrap_err();
    assert_eq!(
        err,
        ApiError::NotAcceptingEntries {
            competition_id,
            status: CompetitionStatus::Closed
        }
    );
}

#[test]
fn test_missing_competition_is_not_found() {
    let mut harness = Harness::new();
    let err = hold(&mut harness, 404, 1, pick(&[1])).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_expired_hold_frees_number_without_sweep() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[7])).unwrap();
    assert_eq!(
        harness
            .reservations
            .count_available(&mut harness.persistence, competition_id)
            .unwrap(),
        9
    );

    harness.clock.advance(15 * 60);

    assert_eq!(
        harness
            .reservations
            .count_available(&mut harness.persistence, competition_id)
            .unwrap(),
        10
    );
    assert_eq!(
        hold(&mut harness, competition_id, 2, pick(&[7])).unwrap(),
        vec![7]
    );
}

#[test]
fn test_release_touches_only_own_unordered_holds() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[1, 2])).unwrap();
    hold(&mut harness, competition_id, 2, pick(&[3])).unwrap();
    harness
        .reservations
        .attach_order(
            &mut harness.persistence,
            &AttachOrderRequest {
                competition_id,
                owner_id: 1,
                numbers: numbers(&[2]),
                order_id: 500,
            },
        )
        .unwrap();

    let released = harness
        .reservations
        .release_tickets(&mut harness.persistence, competition_id, 1, &numbers(&[1, 2, 3]))
        .unwrap();
    assert_eq!(released, 1);

    let owner_one: Vec<i64> = harness
        .reservations
        .list_owner_tickets(&mut harness.persistence, competition_id, 1)
        .unwrap()
        .iter()
        .map(|t| t.ticket_number.as_i64())
        .collect();
    assert_eq!(owner_one, vec![2]);
    assert_eq!(
        harness
            .reservations
            .list_owner_tickets(&mut harness.persistence, competition_id, 2)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_payment_promotes_order_and_counts_sales() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    harness.buy(competition_id, 1, 900, &[4, 5]);

    let tickets = harness
        .reservations
        .list_owner_tickets(&mut harness.persistence, competition_id, 1)
        .unwrap();
    assert!(tickets.iter().all(|t| t.state == TicketState::Active));
    assert!(tickets.iter().all(|t| t.expires_at.is_none()));

    let again = harness
        .reservations
        .confirm_payment(&mut harness.persistence, 900)
        .unwrap();
    assert!(again.is_empty());

    let competition = harness.persistence.get_competition(competition_id).unwrap();
    assert_eq!(competition.tickets_sold, 2);
}

#[test]
fn test_attach_order_extends_hold() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[6])).unwrap();

    harness.clock.advance(10 * 60);
    let attached = harness
        .reservations
        .attach_order(
            &mut harness.persistence,
            &AttachOrderRequest {
                competition_id,
                owner_id: 1,
                numbers: numbers(&[6]),
                order_id: 42,
            },
        )
        .unwrap();
    assert_eq!(attached[0].expires_at, Some(NOW + 10 * 60 + 15 * 60));
    assert_eq!(attached[0].order_id, Some(42));
}

#[test]
fn test_safety_net_sweep_spares_order_attached_hold() {
    let config = ServiceConfig::new(
        Duration::minutes(15),
        Duration::minutes(15),
        100_000,
        3,
        100,
    )
    .unwrap();
    let mut harness = Harness::with_config(config);
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[3])).unwrap();

    harness.clock.advance(14 * 60);
    harness
        .reservations
        .attach_order(
            &mut harness.persistence,
            &AttachOrderRequest {
                competition_id,
                owner_id: 1,
                numbers: numbers(&[3]),
                order_id: 9,
            },
        )
        .unwrap();

    harness.clock.advance(2 * 60);
    let report = harness
        .reservations
        .sweep_reservations(&mut harness.persistence)
        .unwrap();
    assert_eq!(report.total(), 0);

    let promoted = harness
        .reservations
        .confirm_payment(&mut harness.persistence, 9)
        .unwrap();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].state, TicketState::Active);
}

#[test]
fn test_attach_order_for_lapsed_hold_is_not_found() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[6])).unwrap();
    harness.clock.advance(16 * 60);

    let err = harness
        .reservations
        .attach_order(
            &mut harness.persistence,
            &AttachOrderRequest {
                competition_id,
                owner_id: 1,
                numbers: numbers(&[6]),
                order_id: 42,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Reservation"));
}

#[test]
fn test_failed_payment_releases_order_holds() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[1, 2])).unwrap();
    harness
        .reservations
        .attach_order(
            &mut harness.persistence,
            &AttachOrderRequest {
                competition_id,
                owner_id: 1,
                numbers: numbers(&[1, 2]),
                order_id: 77,
            },
        )
        .unwrap();

    let released = harness
        .reservations
        .fail_payment(&mut harness.persistence, 77)
        .unwrap();
    assert_eq!(released, 2);
    assert_eq!(hold(&mut harness, competition_id, 2, pick(&[1, 2])).unwrap(), vec![1, 2]);
}

#[test]
fn test_refund_and_cancel_free_numbers_for_resale() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    harness.buy(competition_id, 1, 10, &[1]);
    harness.buy(competition_id, 2, 20, &[2]);

    let refunded = harness
        .reservations
        .refund_order(&mut harness.persistence, 10)
        .unwrap();
    assert_eq!(refunded[0].state, TicketState::Refunded);
    let cancelled = harness
        .reservations
        .cancel_order(&mut harness.persistence, 20)
        .unwrap();
    assert_eq!(cancelled[0].state, TicketState::Cancelled);

    assert_eq!(
        harness.persistence.get_competition(competition_id).unwrap().tickets_sold,
        0
    );
    assert_eq!(hold(&mut harness, competition_id, 3, pick(&[1, 2])).unwrap(), vec![1, 2]);
}

#[test]
fn test_invalidate_requires_active_ticket() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    harness.buy(competition_id, 1, 10, &[3]);
    let ticket_id = harness
        .reservations
        .list_owner_tickets(&mut harness.persistence, competition_id, 1)
        .unwrap()[0]
        .ticket_id;

    let invalid = harness
        .reservations
        .invalidate_ticket(&mut harness.persistence, ticket_id)
        .unwrap();
    assert_eq!(invalid.state, TicketState::Invalid);

    let err = harness
        .reservations
        .invalidate_ticket(&mut harness.persistence, ticket_id)
        .unwrap_err();
    assert!(matches!(err, ApiError::DomainRuleViolation { .. }));
}

#[test]
fn test_sweep_removes_expired_then_stale_holds() {
    let mut harness = Harness::new();
    let competition_id = harness.create_competition(Some(10), 1, 0, DrawMode::Automatic);
    hold(&mut harness, competition_id, 1, pick(&[1])).unwrap();
    hold(&mut harness, competition_id, 2, pick(&[2])).unwrap();

    // Order 5 keeps its hold alive past the TTL
    harness.clock.advance(10 * 60);
    harness
        .reservations
        .attach_order(
            &mut harness.persistence,
            &AttachOrderRequest {
                competition_id,
                owner_id: 2,
                numbers: numbers(&[2]),
                order_id: 5,
            },
        )
        .unwrap();

    harness.clock.advance(6 * 60);
    let first = harness
        .reservations
        .sweep_reservations(&mut harness.persistence)
        .unwrap();
    assert_eq!(first.expired, 1);
    assert_eq!(first.stale, 0);

    let nothing = harness
        .reservations
        .sweep_reservations(&mut harness.persistence)
        .unwrap();
    assert_eq!(nothing.total(), 0);

    harness.clock.advance(60 * 60);
    let last = harness
        .reservations
        .sweep_reservations(&mut harness.persistence)
        .unwrap();
    assert_eq!(last.total(), 1);
    assert_eq!(
        harness
            .reservations
            .count_available(&mut harness.persistence, competition_id)
            .unwrap(),
        10
    );
}
