// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service configuration.
//!
//! Reservation lifetimes, the lucky-draw search bound and the draw attempt
//! budget are read from here by both services.

use thiserror::Error;
use time::Duration;

use ticket_draw::DEFAULT_ATTEMPT_MULTIPLIER;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Reservations must live for at least one second.
    #[error("Reservation TTL must be positive, got {ttl_secs}s")]
    NonPositiveTtl { ttl_secs: i64 },

    /// The safety-net sweep would delete reservations before they expire.
    #[error(
        "Stale reservation max age ({stale_secs}s) must be at least the reservation TTL ({ttl_secs}s)"
    )]
    StaleAgeBelowTtl { stale_secs: i64, ttl_secs: i64 },

    /// Unlimited competitions need a positive number bound.
    #[error("Unlimited number bound must be positive")]
    ZeroNumberBound,

    /// Lucky-draw allocation needs at least one attempt.
    #[error("Allocation retry budget must be at least 1")]
    ZeroRetries,

    /// Winner selection needs at least one attempt per winner.
    #[error("Draw attempt multiplier must be at least 1")]
    ZeroAttemptMultiplier,
}

/// Tunables shared by the reservation and draw services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    reservation_ttl: Duration,
    stale_reservation_max_age: Duration,
    unlimited_number_bound: u32,
    allocation_retries: u32,
    draw_attempt_multiplier: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            reservation_ttl: Duration::minutes(15),
            stale_reservation_max_age: Duration::minutes(60),
            unlimited_number_bound: 100_000,
            allocation_retries: 3,
            draw_attempt_multiplier: DEFAULT_ATTEMPT_MULTIPLIER,
        }
    }
}

impl ServiceConfig {
    /// Creates a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `reservation_ttl` - How long a hold lasts before it expires
    /// * `stale_reservation_max_age` - Age past which the safety-net sweep
    ///   deletes any reservation; never shorter than the TTL
    /// * `unlimited_number_bound` - Highest number the lucky draw scans when
    ///   a competition has no ticket limit
    /// * `allocation_retries` - Lucky-draw attempts before a conflict is
    ///   reported to the buyer
    /// * `draw_attempt_multiplier` - Winner selection stops after this many
    ///   attempts per requested winner
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first invalid value.
    pub fn new(
        reservation_ttl: Duration,
        stale_reservation_max_age: Duration,
        unlimited_number_bound: u32,
        allocation_retries: u32,
        draw_attempt_multiplier: u32,
    ) -> Result<Self, ConfigError> {
        let ttl_secs = reservation_ttl.whole_seconds();
        if ttl_secs <= 0 {
            return Err(ConfigError::NonPositiveTtl { ttl_secs });
        }
        let stale_secs = stale_reservation_max_age.whole_seconds();
        if stale_secs < ttl_secs {
            return Err(ConfigError::StaleAgeBelowTtl {
                stale_secs,
                ttl_secs,
            });
        }
        if unlimited_number_bound == 0 {
            return Err(ConfigError::ZeroNumberBound);
        }
        if allocation_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if draw_attempt_multiplier == 0 {
            return Err(ConfigError::ZeroAttemptMultiplier);
        }

        Ok(Self {
            reservation_ttl,
            stale_reservation_max_age,
            unlimited_number_bound,
            allocation_retries,
            draw_attempt_multiplier,
        })
    }

    #[must_use]
    pub const fn reservation_ttl(&self) -> Duration {
        self.reservation_ttl
    }

    #[must_use]
    pub const fn stale_reservation_max_age(&self) -> Duration {
        self.stale_reservation_max_age
    }

    #[must_use]
    pub const fn unlimited_number_bound(&self) -> u32 {
        self.unlimited_number_bound
    }

    #[must_use]
    pub const fn allocation_retries(&self) -> u32 {
        self.allocation_retries
    }

    #[must_use]
    pub const fn draw_attempt_multiplier(&self) -> u32 {
        self.draw_attempt_multiplier
    }
}
