// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notifications emitted by the background tasks.
//!
//! Events report what a sweep or draw already did. They are informational
//! only; the database remains the source of truth.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// Slow subscribers lose the oldest events.
const EVENT_BUFFER_SIZE: usize = 100;

/// Something a background task finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// A reservation sweep ran.
    SweepCompleted {
        /// Holds past their own expiry.
        expired: usize,
        /// Holds past the safety-net age.
        stale: usize,
    },
    /// A competition was drawn by the automatic trigger.
    DrawCompleted {
        competition_id: i64,
        draw_id: i64,
        /// Winner rows created, reserves included.
        winners: usize,
        /// The draw stored a failure record instead of winners.
        failed: bool,
    },
}

/// Fan-out of scheduler events to any number of subscribers.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<SchedulerEvent>,
}

impl EventBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Sends an event to current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn broadcast(&self, event: &SchedulerEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => debug!(?event, receivers = count, "Broadcast scheduler event"),
            Err(_) => debug!(?event, "No receivers for scheduler event"),
        }
    }

    /// Receives every event sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs every scheduler event until the broadcaster is dropped.
pub fn spawn_event_logger(broadcaster: &EventBroadcaster) -> JoinHandle<()> {
    let mut rx = broadcaster.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(SchedulerEvent::SweepCompleted { expired, stale }) => {
                    debug!(expired, stale, "Sweep completed");
                }
                Ok(SchedulerEvent::DrawCompleted {
                    competition_id,
                    draw_id,
                    winners,
                    failed,
                }) => {
                    info!(competition_id, draw_id, winners, failed, "Automatic draw completed");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event logger fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
