//! Media acquisition seam
//!
//! The coordinator never touches audio directly. A [`MediaLoader`] turns a
//! [`PlayableRef`] into a [`MediaHandle`]; the handle is the owned resource
//! the coordinator plays, pauses and releases.

use crate::error::Result;
use crate::playback::coordinator::EndSignal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies a unit of audio (a recitation, an instructor's voice clip)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayableRef {
    pub id: String,
    pub source_url: String,
}

impl PlayableRef {
    pub fn new(id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
        }
    }
}

/// An acquired, playable media resource
///
/// The coordinator calls `release` exactly once per handle, on every path:
/// stop, supersede, natural end, disposal, or discarding a stale load.
pub trait MediaHandle: Send + 'static {
    /// Start sounding
    ///
    /// `on_end` is to be notified when the resource finishes by itself.
    /// Notifying it is cheap, never blocks, and is safe from any thread.
    fn play(&mut self, on_end: EndSignal) -> Result<()>;

    /// Stop sounding and rewind to the start
    fn pause_and_reset(&mut self);

    /// Free the underlying resource
    fn release(&mut self);
}

/// Produces media handles for playables
#[async_trait]
pub trait MediaLoader: Send + Sync + 'static {
    /// Fetch and decode the resource behind `playable.source_url`
    ///
    /// # Returns
    /// * `Ok(handle)` - Resource ready to play
    /// * `Err(Error::Acquisition { .. })` - Network or decoding failure
    async fn acquire(&self, playable: &PlayableRef) -> Result<Box<dyn MediaHandle>>;
}
