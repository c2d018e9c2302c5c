// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod events;
mod scheduler;

use clap::Parser;
use std::sync::{Arc, Mutex};
use tracing::info;

use ticket_draw::SystemClock;
use ticket_draw_api::{ConfigError, DrawService, ReservationManager, ServiceConfig};
use ticket_draw_persistence::{Persistence, PersistenceError};

use crate::events::{EventBroadcaster, spawn_event_logger};
use crate::scheduler::{AppState, spawn_draw_trigger, spawn_sweeper};

/// Ticket Draw Server - background reservation sweeps and automatic draws
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, conflicts_with = "mysql_url")]
    database: Option<String>,

    /// `MySQL`/`MariaDB` connection URL.
    #[arg(long)]
    mysql_url: Option<String>,

    /// How long a hold lasts before it expires.
    #[arg(long, default_value_t = 900)]
    reservation_ttl_secs: i64,

    /// Age past which the safety-net sweep deletes any hold.
    #[arg(long, default_value_t = 3_600)]
    stale_reservation_max_age_secs: i64,

    /// Seconds between reservation sweeps.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_secs: u64,

    /// Seconds between checks for due automatic draws.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    draw_check_interval_secs: u64,

    /// Highest number offered by the lucky draw when a competition has no ticket limit.
    #[arg(long, default_value_t = 100_000)]
    unlimited_number_bound: u32,

    /// Lucky-draw attempts before a conflict is reported.
    #[arg(long, default_value_t = 3)]
    allocation_retries: u32,

    /// Winner-selection attempts allowed per requested winner.
    #[arg(long, default_value_t = 100)]
    draw_attempt_multiplier: u32,
}

impl Args {
    fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        ServiceConfig::new(
            time::Duration::seconds(self.reservation_ttl_secs),
            time::Duration::seconds(self.stale_reservation_max_age_secs),
            self.unlimited_number_bound,
            self.allocation_retries,
            self.draw_attempt_multiplier,
        )
    }

    /// No file or server was named; tasks must share one connection.
    const fn is_in_memory(&self) -> bool {
        self.database.is_none() && self.mysql_url.is_none()
    }

    fn open_database(&self) -> Result<Persistence, PersistenceError> {
        if let Some(url) = &self.mysql_url {
            info!("Using MySQL database");
            Persistence::new_with_mysql(url)
        } else if let Some(db_path) = &self.database {
            info!("Using file-based database at: {}", db_path);
            Persistence::new_with_file(db_path)
        } else {
            info!("Using in-memory database");
            Persistence::new_in_memory()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Ticket Draw Server");

    let config: ServiceConfig = args.service_config()?;

    let clock = Arc::new(SystemClock);
    let sweep_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(args.open_database()?)),
        reservations: Arc::new(ReservationManager::new(config.clone(), clock.clone())),
        draws: Arc::new(DrawService::new(config, clock)),
        events: EventBroadcaster::new(),
    };
    let draw_state: AppState = if args.is_in_memory() {
        sweep_state.clone()
    } else {
        sweep_state.with_persistence(args.open_database()?)
    };

    let logger = spawn_event_logger(&sweep_state.events);
    let sweeper = spawn_sweeper(
        sweep_state,
        std::time::Duration::from_secs(args.sweep_interval_secs),
    );
    let trigger = spawn_draw_trigger(
        draw_state,
        std::time::Duration::from_secs(args.draw_check_interval_secs),
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, stopping background tasks");
    sweeper.abort();
    trigger.abort();
    logger.abort();

    Ok(())
}
