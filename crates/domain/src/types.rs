// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A ticket number within one competition.
///
/// Ticket numbers are positive; zero is never a valid number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TicketNumber(u32);

impl TicketNumber {
    /// Creates a ticket number, rejecting zero, negatives and values beyond `u32`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTicketNumber` if the value is not positive.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u32::try_from(value) {
            Ok(number) if number > 0 => Ok(Self(number)),
            _ => Err(DomainError::InvalidTicketNumber(value)),
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns the value widened for storage.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for TicketNumber {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TicketNumber> for i64 {
    fn from(number: TicketNumber) -> Self {
        number.as_i64()
    }
}

impl std::fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a buyer chooses the numbers they want to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketSelection {
    /// The engine picks `quantity` free numbers at random.
    LuckyDraw {
        /// How many tickets to hold.
        quantity: u32,
    },
    /// The buyer names the exact numbers.
    NumberPicker {
        /// The requested numbers.
        numbers: Vec<TicketNumber>,
    },
}

impl TicketSelection {
    /// Number of tickets the selection asks for.
    #[must_use]
    pub fn quantity(&self) -> usize {
        match self {
            Self::LuckyDraw { quantity } => *quantity as usize,
            Self::NumberPicker { numbers } => numbers.len(),
        }
    }
}

/// Who or what started a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawMethod {
    /// Started by the scheduler once `draw_at` passed.
    Automatic,
    /// Started by an administrator through the admin surface.
    AdminTriggered,
    /// Conducted offline and recorded by hand.
    Manual,
}

impl DrawMethod {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::AdminTriggered => "admin-triggered",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for DrawMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Self::Automatic),
            "admin-triggered" => Ok(Self::AdminTriggered),
            "manual" => Ok(Self::Manual),
            _ => Err(DomainError::InvalidDrawMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for DrawMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
