//! In-process progress channel keyed by session id.
//!
//! Each session gets its own `tokio::sync::broadcast` channel, created on the
//! first subscription. Events for sessions nobody listens to are dropped.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::trace;

use crate::ports::{ProgressEvent, ProgressSink};

/// Default buffer capacity of each session channel
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of [`ProgressEvent`]s to the subscribers of each session
pub struct SessionBus {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<ProgressEvent>>>,
}

impl SessionBus {
    /// Bus whose per-session channels buffer `capacity` events.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer overflows.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Receive every event published for `session_id` from now on
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<ProgressEvent> {
        self.channels()
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Sessions that currently have a channel
    pub fn session_count(&self) -> usize {
        self.channels().len()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<ProgressEvent>>> {
        match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ProgressSink for SessionBus {
    fn publish(&self, session_id: &str, event: ProgressEvent) {
        let mut channels = self.channels();
        let Some(sender) = channels.get(session_id) else {
            trace!(session = session_id, percent = event.percent, "No subscriber, progress dropped");
            return;
        };
        // A send error means every receiver is gone.
        if sender.send(event).is_err() {
            channels.remove(session_id);
        }
    }
}
