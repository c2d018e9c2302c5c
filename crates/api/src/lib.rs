// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service boundary for the ticket draw engine.
//!
//! The web, payment and scheduler layers call into two services:
//! [`ReservationManager`] for holds and order settlement, and
//! [`DrawService`] for running, recording and verifying draws. Both take
//! the storage adapter per call and hold no connection of their own.

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

mod auth;
mod config;
mod draws;
mod error;
mod request_response;
mod reservations;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role};
pub use config::{ConfigError, ServiceConfig};
pub use draws::DrawService;
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_draw_error,
    translate_persistence_error,
};
pub use request_response::{
    AttachOrderRequest, CreateDrawRecordRequest, DrawOutcome, DrawRun, HoldTicketsRequest,
    HoldTicketsResponse, SweepReport, UpdateDrawMetadataRequest, VerifyDrawResponse,
};
pub use reservations::ReservationManager;
