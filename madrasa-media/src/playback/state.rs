//! Playback state snapshot

use madrasa_common::events::PlaybackPhase;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the coordinator, for rendering
///
/// `phase == Idle` exactly when `active_id` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub active_id: Option<String>,
    pub phase: PlaybackPhase,
}

impl PlaybackSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == PlaybackPhase::Idle
    }

    /// Phase of `id` from the view's point of view (Idle unless it is the active one)
    pub fn phase_of(&self, id: &str) -> PlaybackPhase {
        match &self.active_id {
            Some(active) if active == id => self.phase,
            _ => PlaybackPhase::Idle,
        }
    }
}

/// Result of a play/toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Acquisition started for the requested playable
    Loading,
    /// The requested playable was playing and has been stopped
    Stopped,
    /// The requested playable is already loading; nothing changed
    AlreadyLoading,
    /// The coordinator has been disposed; nothing changed
    Disposed,
}
