//! # Madrasa Media Library (madrasa-media)
//!
//! Stateful media controllers shared by the school website's pages.
//!
//! **Purpose:** guarantee that at most one recitation or voice clip sounds at
//! a time, and rotate carousels on a timer with manual navigation, hover
//! pause and responsive page sizing.
//!
//! **Architecture:** two independent controllers built on the same pattern,
//! exclusive ownership of a transient resource (a media handle, a timer task)
//! with generation tokens checked at every asynchronous callback boundary:
//! - [`PlaybackCoordinator`]: single-flight playback
//! - [`RotationScheduler`]: auto-advancing clamped window
//! - [`ViewBinding`]: wires UI events to both

pub mod error;
pub mod playback;
pub mod rotation;
pub mod task;
pub mod view;

pub use error::{Error, Result};
pub use playback::{
    EndSignal, MediaHandle, MediaLoader, PlayableRef, PlaybackCoordinator, PlaybackSnapshot,
    RequestOutcome,
};
pub use rotation::{Breakpoints, RotationScheduler, RotationSnapshot, RotationWindow};
pub use view::{ViewBinding, ViewEvent, ViewSnapshot};
