// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure draw engine: seeds, keyed winner selection, lucky-number
//! allocation and replay of stored records. Nothing here touches storage.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod clock;
mod engine;
mod error;
mod lucky;
mod replay;
mod seed;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    ALGORITHM, DEFAULT_ATTEMPT_MULTIPLIER, DrawSelection, pick_winners, pick_winners_bounded,
    snapshot_digest,
};
pub use error::{CoreError, DrawError};
pub use lucky::select_lucky_numbers;
pub use replay::{ReplayOutcome, replay_record};
pub use seed::{SEED_LENGTH, Seed, generate_seed};
