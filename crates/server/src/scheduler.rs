// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background timers: the reservation sweep and the automatic-draw trigger.
//!
//! Storage calls are synchronous, so each tick runs on the blocking pool.
//! Every task owns its connection; only the in-memory database is shared,
//! because a second in-memory connection would be a different database.
//! A failed tick is logged and the timer keeps running.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use ticket_draw_api::{ApiError, DrawOutcome, DrawService, ReservationManager, SweepReport};
use ticket_draw_persistence::Persistence;

use crate::events::{EventBroadcaster, SchedulerEvent};

/// Services and the storage connection used by one background task.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<Mutex<Persistence>>,
    pub reservations: Arc<ReservationManager>,
    pub draws: Arc<DrawService>,
    pub events: EventBroadcaster,
}

impl AppState {
    /// The same services over a different connection.
    #[must_use]
    pub fn with_persistence(&self, persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            reservations: Arc::clone(&self.reservations),
            draws: Arc::clone(&self.draws),
            events: self.events.clone(),
        }
    }
}

/// Runs a storage operation on the blocking pool.
///
/// The connection lock is taken and released inside the blocking task, so
/// no lock is held while the async side waits.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Persistence) -> Result<T, ApiError> + Send + 'static,
{
    let persistence = Arc::clone(&state.persistence);
    tokio::task::spawn_blocking(move || {
        let mut conn = persistence.lock().map_err(|_| ApiError::Internal {
            message: String::from("Storage connection lock poisoned"),
        })?;
        op(&mut conn)
    })
    .await
    .map_err(|e| ApiError::Internal {
        message: format!("Storage task failed: {e}"),
    })?
}

/// Runs one reservation sweep and reports it.
///
/// # Errors
///
/// Returns an error if a sweep delete fails.
pub async fn sweep_once(state: &AppState) -> Result<SweepReport, ApiError> {
    let reservations = Arc::clone(&state.reservations);
    let report = run_blocking(state, move |persistence| {
        reservations.sweep_reservations(persistence)
    })
    .await?;
    state.events.broadcast(&SchedulerEvent::SweepCompleted {
        expired: report.expired,
        stale: report.stale,
    });
    Ok(report)
}

/// Draws every due automatic competition and reports each draw.
///
/// # Errors
///
/// Returns an error if the due competitions cannot be listed.
pub async fn draw_due_once(state: &AppState) -> Result<Vec<DrawOutcome>, ApiError> {
    let draws = Arc::clone(&state.draws);
    let outcomes = run_blocking(state, move |persistence| {
        draws.run_automatic_draws(persistence)
    })
    .await?;
    for outcome in &outcomes {
        state.events.broadcast(&SchedulerEvent::DrawCompleted {
            competition_id: outcome.record.competition_id,
            draw_id: outcome.record.draw_id,
            winners: outcome.winners.len(),
            failed: !outcome.record.is_successful(),
        });
    }
    Ok(outcomes)
}

/// Starts the reservation sweep on a fixed period.
pub fn spawn_sweeper(state: AppState, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "Starting reservation sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep_once(&state).await {
                error!(error = %err, "Reservation sweep failed");
            }
        }
    })
}

/// Starts the automatic-draw trigger on a fixed period.
pub fn spawn_draw_trigger(state: AppState, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "Starting automatic draw trigger");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = draw_due_once(&state).await {
                error!(error = %err, "Automatic draw check failed");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use ticket_draw::ManualClock;
    use ticket_draw_api::{AttachOrderRequest, HoldTicketsRequest, ServiceConfig};
    use ticket_draw_domain::{DrawMode, TicketNumber, TicketSelection};
    use ticket_draw_persistence::NewCompetition;

    const NOW: i64 = 1_700_000_000;

    fn test_state_with(persistence: Persistence) -> (AppState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        let config = ServiceConfig::default();
        let state = AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            reservations: Arc::new(ReservationManager::new(config.clone(), clock.clone())),
            draws: Arc::new(DrawService::new(config, clock.clone())),
            events: EventBroadcaster::new(),
        };
        (state, clock)
    }

    fn test_state() -> (AppState, Arc<ManualClock>) {
        test_state_with(Persistence::new_in_memory().unwrap())
    }

    fn open_competition(state: &AppState) -> i64 {
        state
            .persistence
            .lock()
            .unwrap()
            .create_competition(
                &NewCompetition {
                    title: String::from("Scheduler Raffle"),
                    ticket_limit: Some(10),
                    draw_at: NOW + 60,
                    draw_mode: DrawMode::Automatic,
                    winner_count: 1,
                    reserve_count: 0,
                },
                NOW,
            )
            .unwrap()
    }

    fn hold(state: &AppState, competition_id: i64, owner_id: i64, number: i64) {
        let mut persistence = state.persistence.lock().unwrap();
        state
            .reservations
            .hold_tickets(
                &mut persistence,
                &HoldTicketsRequest {
                    competition_id,
                    owner_id,
                    selection: TicketSelection::NumberPicker {
                        numbers: vec![TicketNumber::new(number).unwrap()],
                    },
                },
            )
            .unwrap();
    }

    /// File-backed database removed on drop.
    struct TempDatabase {
        path: PathBuf,
    }

    impl TempDatabase {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "ticket-draw-server-{name}-{}.sqlite3",
                std::process::id()
            ));
            let _ = std::fs::remove_file(&path);
            Self { path }
        }

        fn open(&self) -> Persistence {
            Persistence::new_with_file(&self.path).unwrap()
        }
    }

    impl Drop for TempDatabase {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut name = self.path.clone().into_os_string();
                name.push(suffix);
                let _ = std::fs::remove_file(PathBuf::from(name));
            }
        }
    }

    #[tokio::test]
    async fn test_sweep_once_reports_expired_holds() {
        let (state, clock) = test_state();
        let competition_id = open_competition(&state);
        hold(&state, competition_id, 1, 4);
        let mut events = state.events.subscribe();

        clock.advance(15 * 60);
        let report = sweep_once(&state).await.unwrap();

        assert_eq!(report.expired, 1);
        assert_eq!(
            events.recv().await.unwrap(),
            SchedulerEvent::SweepCompleted {
                expired: 1,
                stale: 0
            }
        );
    }

    #[tokio::test]
    async fn test_draw_due_once_draws_and_reports() {
        let (state, clock) = test_state();
        let competition_id = open_competition(&state);
        hold(&state, competition_id, 1, 7);
        {
            let mut persistence = state.persistence.lock().unwrap();
            state
                .reservations
                .attach_order(
                    &mut persistence,
                    &AttachOrderRequest {
                        competition_id,
                        owner_id: 1,
                        numbers: vec![TicketNumber::new(7).unwrap()],
                        order_id: 70,
                    },
                )
                .unwrap();
            state
                .reservations
                .confirm_payment(&mut persistence, 70)
                .unwrap();
        }
        let mut events = state.events.subscribe();

        assert!(draw_due_once(&state).await.unwrap().is_empty());

        clock.advance(60);
        let outcomes = draw_due_once(&state).await.unwrap();
        assert_eq!(outcomes.len(), 1);

        match events.recv().await.unwrap() {
            SchedulerEvent::DrawCompleted {
                competition_id: drawn,
                winners,
                failed,
                ..
            } => {
                assert_eq!(drawn, competition_id);
                assert_eq!(winners, 1);
                assert!(!failed);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sweep_runs_while_draw_connection_is_busy() {
        let db = TempDatabase::new("busy");
        let (draw_state, clock) = test_state_with(db.open());
        let sweep_state = draw_state.with_persistence(db.open());
        let competition_id = open_competition(&draw_state);
        hold(&draw_state, competition_id, 1, 4);
        clock.advance(15 * 60);

        let busy = Arc::clone(&draw_state.persistence);
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder = std::thread::spawn(move || {
            let _conn = busy.lock().unwrap();
            locked_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });
        locked_rx.recv().unwrap();

        let report = tokio::time::timeout(Duration::from_secs(5), sweep_once(&sweep_state))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.expired, 1);

        release_tx.send(()).unwrap();
        holder.join().unwrap();
    }

    #[tokio::test]
    async fn test_spawned_sweeper_ticks() {
        let (state, _clock) = test_state();
        let mut events = state.events.subscribe();

        let handle = spawn_sweeper(state.clone(), Duration::from_millis(10));
        let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        handle.abort();

        assert_eq!(
            first,
            SchedulerEvent::SweepCompleted {
                expired: 0,
                stale: 0
            }
        );
    }
}
