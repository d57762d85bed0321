//! Playback and rotation type definitions
//!
//! Supporting enums shared by the controller snapshots and the events they emit.

use serde::{Deserialize, Serialize};

/// Phase of the single active playable
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// Nothing loaded
    #[default]
    Idle,
    /// Media resource is being acquired
    Loading,
    /// Media resource acquired and sounding
    Playing,
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Idle => write!(f, "idle"),
            PlaybackPhase::Loading => write!(f, "loading"),
            PlaybackPhase::Playing => write!(f, "playing"),
        }
    }
}

/// Why an active playable left the Loading/Playing phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Explicit stop or toggle-to-stop
    Requested,
    /// Resource reached its natural end
    Ended,
    /// A request for another playable retired this one
    Superseded,
    /// The owning coordinator was disposed
    Disposed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Requested => write!(f, "requested"),
            StopReason::Ended => write!(f, "ended"),
            StopReason::Superseded => write!(f, "superseded"),
            StopReason::Disposed => write!(f, "disposed"),
        }
    }
}

/// What moved the rotation window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RotationTrigger {
    /// Auto-advance interval fired
    Timer,
    /// next / prev / jump from the view
    Manual,
    /// Items-per-view changed and the index was re-clamped
    Resize,
    /// Item count changed and the index was re-clamped
    ContentChanged,
}

impl std::fmt::Display for RotationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationTrigger::Timer => write!(f, "timer"),
            RotationTrigger::Manual => write!(f, "manual"),
            RotationTrigger::Resize => write!(f, "resize"),
            RotationTrigger::ContentChanged => write!(f, "content_changed"),
        }
    }
}
