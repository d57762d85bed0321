//! Event types and the in-process event bus
//!
//! The playback coordinator and the rotation scheduler report their
//! transitions here so the view layer can re-render without polling.
//! Failures such as an acquisition error are delivered as events, never as
//! errors returned to the caller.

mod playback_types;

pub use playback_types::{PlaybackPhase, RotationTrigger, StopReason};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Media controller events
///
/// Serialized with an internal `type` tag so a view layer can forward them
/// verbatim as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MediaEvent {
    /// A playable became the active one and its resource is being acquired
    PlaybackLoading {
        /// Playable id
        id: String,
        /// When loading started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Acquired resource started sounding
    PlaybackStarted {
        /// Playable id
        id: String,
        /// When playback started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active playable was retired (its resource has been released)
    PlaybackStopped {
        /// Playable id
        id: String,
        /// Why it stopped
        reason: StopReason,
        /// When it stopped
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Resource for the active playable could not be acquired
    ///
    /// Non-fatal: the coordinator is already back to idle when this is sent.
    AcquisitionFailed {
        /// Playable id
        id: String,
        /// Human readable failure description
        reason: String,
        /// When the failure was observed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Rotation window moved
    RotationAdvanced {
        /// New leftmost visible item
        index: usize,
        /// Page containing `index` (for pagination dots)
        page: usize,
        /// What caused the move
        trigger: RotationTrigger,
        /// When the window moved
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MediaEvent {
    /// Event type name (matches the serialized `type` tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            MediaEvent::PlaybackLoading { .. } => "PlaybackLoading",
            MediaEvent::PlaybackStarted { .. } => "PlaybackStarted",
            MediaEvent::PlaybackStopped { .. } => "PlaybackStopped",
            MediaEvent::AcquisitionFailed { .. } => "AcquisitionFailed",
            MediaEvent::RotationAdvanced { .. } => "RotationAdvanced",
        }
    }
}

/// In-process broadcast bus for [`MediaEvent`]s
///
/// Wraps `tokio::sync::broadcast`: publishing never blocks, slow subscribers
/// observe `Lagged` rather than stalling the controllers, and dropped
/// receivers are cleaned up automatically.
///
/// # Examples
///
/// ```
/// use madrasa_common::events::{EventBus, MediaEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(MediaEvent::PlaybackLoading {
///     id: "al-fatiha".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(MediaEvent::PlaybackLoading { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MediaEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MediaEvent,
    ) -> Result<usize, broadcast::error::SendError<MediaEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MediaEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
