// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transaction helper shared by every multi-step mutation.
//!
//! Reservation inserts, payment promotion and draw recording each touch
//! several rows that must change together. They run through
//! [`with_transaction`], which opens a real transaction when the store
//! supports one and otherwise runs the steps one after another.
//!
//! The sequential fallback is explicit: it is selected once when the
//! connection is opened, and every use logs a warning naming the
//! operation, because a failure midway leaves the earlier steps applied.

use tracing::warn;

use crate::backend::PersistenceBackend;
use crate::error::PersistenceError;

/// How multi-step mutations are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// All steps commit together or not at all.
    #[default]
    Atomic,
    /// Steps run in order with no rollback on failure.
    Sequential,
}

impl TransactionMode {
    /// Chooses the mode the connected store can honor.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability query fails.
    pub fn detect<C: PersistenceBackend>(conn: &mut C) -> Result<Self, PersistenceError> {
        if conn.supports_transactions()? {
            Ok(Self::Atomic)
        } else {
            warn!("Store does not support transactions; multi-step writes will not roll back");
            Ok(Self::Sequential)
        }
    }
}

/// Runs `f` as one unit of work.
///
/// In [`TransactionMode::Atomic`] the steps commit together and any `Err`
/// rolls all of them back. In [`TransactionMode::Sequential`] the steps run
/// directly on the connection and a warning names `operation`.
///
/// # Errors
///
/// Returns whatever `f` returns, or a database error if the transaction
/// cannot be opened or committed.
pub fn with_transaction<C, T, F>(
    conn: &mut C,
    mode: TransactionMode,
    operation: &str,
    f: F,
) -> Result<T, PersistenceError>
where
    C: PersistenceBackend,
    F: FnOnce(&mut C) -> Result<T, PersistenceError>,
{
    match mode {
        TransactionMode::Atomic => conn.atomic(f),
        TransactionMode::Sequential => {
            warn!(
                operation,
                "Running without a transaction; a failure will not roll back earlier steps"
            );
            f(conn)
        }
    }
}
