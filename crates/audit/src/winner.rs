// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ticket_draw_domain::TicketNumber;

use crate::error::AuditError;

/// Whether the winner has been told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    #[default]
    Pending,
    Sent,
}

impl NotificationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            _ => Err(AuditError::InvalidWinnerStatus(s.to_string())),
        }
    }
}

/// Whether the prize has been claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[default]
    Unclaimed,
    Claimed,
}

impl ClaimStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::Claimed => "claimed",
        }
    }
}

impl FromStr for ClaimStatus {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unclaimed" => Ok(Self::Unclaimed),
            "claimed" => Ok(Self::Claimed),
            _ => Err(AuditError::InvalidWinnerStatus(s.to_string())),
        }
    }
}

/// A winner derived from one draw result entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerRecord {
    pub winner_id: i64,
    pub draw_id: i64,
    pub competition_id: i64,
    pub ticket_id: i64,
    pub ticket_number: TicketNumber,
    pub owner_id: Option<i64>,
    pub position: u32,
    pub is_reserve: bool,
    pub claim_code: String,
    pub notification_status: NotificationStatus,
    pub claim_status: ClaimStatus,
}
