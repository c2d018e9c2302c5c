// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for multi-database support.
//!
//! These tests check that the schema behaves the same on `MariaDB` as on
//! `SQLite`: migrations apply, foreign keys and unique keys are enforced,
//! the storage engine supports transactions, and the ledger's slot
//! uniqueness holds.
//!
//! ## Test Execution
//!
//! - `SQLite` tests run normally via `cargo test`
//! - `MariaDB` tests are marked `#[ignore]` and run only via `cargo xtask test-mariadb`
//!
//! `MariaDB` tests require `DATABASE_URL` and
//! `TICKET_DRAW_TEST_BACKEND=mariadb`, both set by xtask. They fail fast
//! if either is missing.
//!
//! Business rules are covered by the `SQLite` suite; these tests use raw
//! SQL against the schema.

use diesel::MysqlConnection;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use std::env;

use super::{NOW, TTL, create_competition, numbers};
use crate::backend::mysql;
use crate::{Persistence, PersistenceError, TransactionMode};

/// Result type for COUNT queries.
#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Result type for `LAST_INSERT_ID` queries.
#[derive(QueryableByName)]
struct LastInsertIdResult {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_mariadb_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - MariaDB tests must be run via `cargo xtask test-mariadb`")
}

/// # Panics
///
/// Panics if `TICKET_DRAW_TEST_BACKEND` is not set to `mariadb`.
fn verify_mariadb_test_environment() {
    let backend = env::var("TICKET_DRAW_TEST_BACKEND").expect(
        "TICKET_DRAW_TEST_BACKEND not set - MariaDB tests must be run via `cargo xtask test-mariadb`",
    );
    assert_eq!(backend, "mariadb", "TICKET_DRAW_TEST_BACKEND must be 'mariadb'");
}

fn insert_competition(conn: &mut MysqlConnection) -> i64 {
    diesel::sql_query(
        "INSERT INTO competitions (title, ticket_limit, draw_at, created_at)
         VALUES ('Backend Test', 100, 1700003600, 1700000000)",
    )
    .execute(conn)
    .expect("Failed to insert competition");

    diesel::sql_query("SELECT LAST_INSERT_ID() as id")
        .get_result::<LastInsertIdResult>(conn)
        .map(|r| r.id)
        .expect("Failed to get competition_id")
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_connection() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = MysqlConnection::establish(&url);
    assert!(
        result.is_ok(),
        "Failed to connect to MariaDB: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_migrations_apply_cleanly() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = mysql::initialize_database(&url);
    assert!(
        result.is_ok(),
        "Failed to initialize MariaDB and run migrations: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_foreign_key_enforcement() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    let result = mysql::verify_foreign_key_enforcement(&mut conn);
    assert!(
        result.is_ok(),
        "Foreign key enforcement verification failed: {:?}",
        result.err()
    );

    let orphan = diesel::sql_query(
        "INSERT INTO tickets (competition_id, ticket_number, slot_number, state, created_at)
         VALUES (99999999, 1, 1, 'reserved', 1700000000)",
    )
    .execute(&mut conn);
    assert!(
        orphan.is_err(),
        "Ticket with non-existent competition should fail due to foreign key constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_engine_supports_transactions() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    assert!(mysql::supports_transactions(&mut conn).expect("Engine query failed"));

    let persistence = Persistence::new_with_mysql(&url).expect("Failed to open MariaDB");
    assert_eq!(persistence.transaction_mode(), TransactionMode::Atomic);
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_slot_unique_constraint() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");
    let competition_id = insert_competition(&mut conn);

    diesel::sql_query(format!(
        "INSERT INTO tickets (competition_id, ticket_number, slot_number, state, created_at)
         VALUES ({competition_id}, 7, 7, 'active', 1700000000)"
    ))
    .execute(&mut conn)
    .expect("Failed to insert ticket");

    let duplicate = diesel::sql_query(format!(
        "INSERT INTO tickets (competition_id, ticket_number, slot_number, state, created_at)
         VALUES ({competition_id}, 7, 7, 'reserved', 1700000000)"
    ))
    .execute(&mut conn);
    assert!(
        duplicate.is_err(),
        "Second live row for the same number should fail due to UNIQUE constraint"
    );

    // Released rows carry a NULL slot and never collide
    for _ in 0..2 {
        diesel::sql_query(format!(
            "INSERT INTO tickets (competition_id, ticket_number, slot_number, state, created_at)
             VALUES ({competition_id}, 7, NULL, 'refunded', 1700000000)"
        ))
        .execute(&mut conn)
        .expect("Released rows should not conflict");
    }

    let count: i64 = diesel::sql_query(format!(
        "SELECT COUNT(*) as count FROM tickets WHERE competition_id = {competition_id}"
    ))
    .get_result::<CountResult>(&mut conn)
    .map(|r| r.count)
    .expect("Failed to count tickets");
    assert_eq!(count, 3);
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_claim_code_unique_constraint() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");
    let competition_id = insert_competition(&mut conn);

    diesel::sql_query(format!(
        "INSERT INTO draws (competition_id, drawn_at, seed_hex, algorithm, snapshot_count,
                            results_json, result_count, requested_winners, method)
         VALUES ({competition_id}, '2023-11-14T22:13:20Z', 'ab', 'hmac-sha256-v1', 0,
                 '[]', 0, 1, 'automatic')"
    ))
    .execute(&mut conn)
    .expect("Failed to insert draw");
    let draw_id: i64 = diesel::sql_query("SELECT LAST_INSERT_ID() as id")
        .get_result::<LastInsertIdResult>(&mut conn)
        .map(|r| r.id)
        .expect("Failed to get draw_id");

    let mut ticket_ids: Vec<i64> = Vec::new();
    for number in [1, 2] {
        diesel::sql_query(format!(
            "INSERT INTO tickets (competition_id, ticket_number, slot_number, state, created_at)
             VALUES ({competition_id}, {number}, {number}, 'winner', 1700000000)"
        ))
        .execute(&mut conn)
        .expect("Failed to insert ticket");
        ticket_ids.push(
            diesel::sql_query("SELECT LAST_INSERT_ID() as id")
                .get_result::<LastInsertIdResult>(&mut conn)
                .map(|r| r.id)
                .expect("Failed to get ticket_id"),
        );
    }
    let (first, second) = (ticket_ids[0], ticket_ids[1]);

    let code = format!("WIN-T{competition_id:07}");
    diesel::sql_query(format!(
        "INSERT INTO winners (draw_id, competition_id, ticket_id, ticket_number, position,
                              claim_code, created_at)
         VALUES ({draw_id}, {competition_id}, {first}, 1, 1, '{code}', 1700000000)"
    ))
    .execute(&mut conn)
    .expect("Failed to insert winner");

    let duplicate = diesel::sql_query(format!(
        "INSERT INTO winners (draw_id, competition_id, ticket_id, ticket_number, position,
                              claim_code, created_at)
         VALUES ({draw_id}, {competition_id}, {second}, 2, 2, '{code}', 1700000000)"
    ))
    .execute(&mut conn);
    assert!(
        duplicate.is_err(),
        "Duplicate claim code should fail due to UNIQUE constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_transaction_rollback() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    conn.begin_test_transaction()
        .expect("Failed to begin transaction");

    diesel::sql_query(
        "INSERT INTO competitions (title, draw_at, created_at)
         VALUES ('rollback_test', 1700003600, 1700000000)",
    )
    .execute(&mut conn)
    .expect("Failed to insert competition");

    let count: i64 = diesel::sql_query(
        "SELECT COUNT(*) as count FROM competitions WHERE title = 'rollback_test'",
    )
    .get_result::<CountResult>(&mut conn)
    .map(|r| r.count)
    .expect("Failed to count competitions");
    assert_eq!(count, 1, "Competition should exist within transaction");

    // Test transactions roll back when the connection is dropped
    drop(conn);

    let mut new_conn = mysql::initialize_database(&url).expect("Failed to reconnect to MariaDB");
    let count_after: i64 = diesel::sql_query(
        "SELECT COUNT(*) as count FROM competitions WHERE title = 'rollback_test'",
    )
    .get_result::<CountResult>(&mut new_conn)
    .map(|r| r.count)
    .expect("Failed to count competitions after rollback");
    assert_eq!(
        count_after, 0,
        "Competition should not exist after transaction rollback"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_allocation_conflict() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut persistence = Persistence::new_with_mysql(&url).expect("Failed to open MariaDB");
    let competition_id = create_competition(&mut persistence, Some(50));

    persistence
        .allocate_tickets(competition_id, &numbers(&[3, 4]), 1, NOW, NOW + TTL)
        .expect("First allocation should succeed");

    let err = persistence
        .allocate_tickets(competition_id, &numbers(&[4, 5]), 2, NOW, NOW + TTL)
        .unwrap_err();
    assert_eq!(
        err,
        PersistenceError::TicketConflict {
            numbers: numbers(&[4])
        }
    );
}
