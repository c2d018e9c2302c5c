// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit types for draw executions.
//!
//! A draw produces exactly one immutable record carrying the seed, the
//! verbatim snapshot of eligible tickets and the ordered winner list. Only
//! the notes and evidence URL of a stored record may change afterwards.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod claim_code;
mod error;
mod record;
mod winner;

#[cfg(test)]
mod tests;

pub use claim_code::{CLAIM_CODE_PREFIX, generate_claim_code};
pub use error::AuditError;
pub use record::{Actor, DrawFailure, DrawRecord, DrawResultEntry, NewDrawRecord, SnapshotEntry};
pub use winner::{ClaimStatus, NotificationStatus, WinnerRecord};
