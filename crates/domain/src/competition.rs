// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Competition status lifecycle.
//!
//! A competition sells tickets while `live`, may be `closed` early, is
//! claimed for drawing by moving to `ended`, and becomes `drawn` exactly
//! once after a draw record exists.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    /// Accepting entries.
    Live,
    /// Sales stopped, awaiting the draw.
    Closed,
    /// Claimed by a draw in progress.
    Ended,
    /// A draw record exists.
    Drawn,
    /// Abandoned without a draw.
    Cancelled,
}

impl CompetitionStatus {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Closed => "closed",
            Self::Ended => "ended",
            Self::Drawn => "drawn",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only live competitions accept new reservations.
    #[must_use]
    pub const fn accepts_entries(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Statuses a draw may be claimed from.
    pub const DRAWABLE: [Self; 2] = [Self::Live, Self::Closed];

    /// Whether a draw may be claimed from this status.
    #[must_use]
    pub const fn is_drawable(&self) -> bool {
        matches!(self, Self::Live | Self::Closed)
    }

    /// Validates a status transition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCompetitionTransition` if not permitted.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        let valid = matches!(
            (self, target),
            (Self::Live, Self::Closed | Self::Ended | Self::Cancelled)
                | (Self::Closed, Self::Ended | Self::Cancelled)
                | (Self::Ended, Self::Drawn | Self::Closed)
        );

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidCompetitionTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for CompetitionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "closed" => Ok(Self::Closed),
            "ended" => Ok(Self::Ended),
            "drawn" => Ok(Self::Drawn),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidCompetitionStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the scheduler draws the competition on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Drawn by the scheduler once `draw_at` has passed.
    #[default]
    Automatic,
    /// Drawn only when an administrator asks.
    Manual,
}

impl DrawMode {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for DrawMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Self::Automatic),
            "manual" => Ok(Self::Manual),
            _ => Err(DomainError::InvalidDrawMode(s.to_string())),
        }
    }
}

/// The parts of a competition the engine cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub competition_id: i64,
    pub title: String,
    /// `None` means unlimited.
    pub ticket_limit: Option<u32>,
    pub tickets_sold: u32,
    pub status: CompetitionStatus,
    /// Scheduled draw instant, Unix seconds.
    pub draw_at: i64,
    pub draw_mode: DrawMode,
    /// Primary winners.
    pub winner_count: u32,
    /// Reserve winners drawn after the primaries.
    pub reserve_count: u32,
}

impl Competition {
    /// Total number of winners (primary plus reserve) a draw should pick.
    #[must_use]
    pub const fn total_winners(&self) -> u32 {
        self.winner_count.saturating_add(self.reserve_count)
    }

    /// Highest number the lucky-draw scan considers.
    #[must_use]
    pub const fn number_bound(&self, unlimited_bound: u32) -> u32 {
        match self.ticket_limit {
            Some(limit) => limit,
            None => unlimited_bound,
        }
    }

    /// Whether the scheduler should draw this competition at `now`.
    #[must_use]
    pub const fn is_due_for_automatic_draw(&self, now: i64) -> bool {
        matches!(self.draw_mode, DrawMode::Automatic)
            && self.status.is_drawable()
            && self.draw_at <= now
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn competition(status: CompetitionStatus, draw_mode: DrawMode) -> Competition {
        Competition {
            competition_id: 1,
            title: String::from("Test"),
            ticket_limit: Some(10),
            tickets_sold: 0,
            status,
            draw_at: 1_000,
            draw_mode,
            winner_count: 1,
            reserve_count: 2,
        }
    }

    #[test]
    fn test_drawn_and_cancelled_are_final() {
        for target in [
            CompetitionStatus::Live,
            CompetitionStatus::Closed,
            CompetitionStatus::Ended,
            CompetitionStatus::Drawn,
            CompetitionStatus::Cancelled,
        ] {
            assert!(CompetitionStatus::Drawn.validate_transition(target).is_err());
            assert!(CompetitionStatus::Cancelled.validate_transition(target).is_err());
        }
    }

    #[test]
    fn test_drawn_only_reachable_from_ended() {
        assert!(
            CompetitionStatus::Ended
                .validate_transition(CompetitionStatus::Drawn)
                .is_ok()
        );
        assert!(
            CompetitionStatus::Live
                .validate_transition(CompetitionStatus::Drawn)
                .is_err()
        );
        assert!(
            CompetitionStatus::Closed
                .validate_transition(CompetitionStatus::Drawn)
                .is_err()
        );
    }

    #[test]
    fn test_only_live_accepts_entries() {
        assert!(CompetitionStatus::Live.accepts_entries());
        assert!(!CompetitionStatus::Closed.accepts_entries());
        assert!(!CompetitionStatus::Ended.accepts_entries());
    }

    #[test]
    fn test_due_for_automatic_draw() {
        let auto = competition(CompetitionStatus::Live, DrawMode::Automatic);
        assert!(!auto.is_due_for_automatic_draw(999));
        assert!(auto.is_due_for_automatic_draw(1_000));

        let manual = competition(CompetitionStatus::Live, DrawMode::Manual);
        assert!(!manual.is_due_for_automatic_draw(5_000));

        let drawn = competition(CompetitionStatus::Drawn, DrawMode::Automatic);
        assert!(!drawn.is_due_for_automatic_draw(5_000));
    }

    #[test]
    fn test_total_winners_and_bound() {
        let mut c = competition(CompetitionStatus::Live, DrawMode::Automatic);
        assert_eq!(c.total_winners(), 3);
        assert_eq!(c.number_bound(100_000), 10);
        c.ticket_limit = None;
        assert_eq!(c.number_bound(100_000), 100_000);
    }
}
