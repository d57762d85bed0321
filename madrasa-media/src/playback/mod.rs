//! Single-flight audio playback

pub mod coordinator;
pub mod loader;
pub mod state;

pub use coordinator::{EndSignal, PlaybackCoordinator};
pub use loader::{MediaHandle, MediaLoader, PlayableRef};
pub use state::{PlaybackSnapshot, RequestOutcome};
