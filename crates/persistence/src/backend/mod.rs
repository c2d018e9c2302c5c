// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates backend-specific initialization, migration,
//! and helper functions that cannot be expressed in backend-agnostic
//! Diesel DSL.
//!
//! ## Backend Support
//!
//! - `sqlite` — `SQLite` backend (default for development and testing)
//! - `mysql` — MySQL/MariaDB backend (validated via opt-in tests)
//!
//! ## Backend-Agnostic Code
//!
//! Backend-specific code is limited to:
//!
//! - Connection initialization and configuration (PRAGMA, engine checks)
//! - Migration execution
//! - Opening an atomic write transaction
//! - Retrieving auto-increment IDs
//!
//! All ledger and draw queries live in `queries/` and `mutations/` and
//! must work across all supported backends.

pub mod mysql;
pub mod sqlite;

use diesel::{Connection, MysqlConnection, SqliteConnection};

use crate::error::PersistenceError;

/// Trait for backend-specific operations.
///
/// Implemented for both `SqliteConnection` and `MysqlConnection` so the
/// transaction helper and the mutation bodies generated by `backend_fn!`
/// can call them without knowing the concrete backend.
pub trait PersistenceBackend: Connection + Sized {
    /// Retrieves the last inserted row ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;

    /// Reports whether the connected store can run multi-statement
    /// atomic transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability query fails.
    fn supports_transactions(&mut self) -> Result<bool, PersistenceError>;

    /// Runs `f` inside a write transaction, committing on `Ok` and rolling
    /// back on `Err`.
    ///
    /// On `SQLite` the transaction takes the write lock up front
    /// (`BEGIN IMMEDIATE`) so two writers never both read a free number
    /// and then race to insert it.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a database error if the
    /// transaction cannot be opened or committed.
    fn atomic<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }

    fn supports_transactions(&mut self) -> Result<bool, PersistenceError> {
        Ok(true)
    }

    fn atomic<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.immediate_transaction(f)
    }
}

impl PersistenceBackend for MysqlConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        mysql::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        mysql::verify_foreign_key_enforcement(self)
    }

    fn supports_transactions(&mut self) -> Result<bool, PersistenceError> {
        mysql::supports_transactions(self)
    }

    fn atomic<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.transaction(f)
    }
}
