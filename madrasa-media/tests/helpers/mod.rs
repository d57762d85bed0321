//! Test helper modules for madrasa-media integration tests
//!
//! - ScriptedLoader: media loader whose loads complete on demand
//! - MediaLog: records play/pause/release calls per playable
//! - drain_events: collect everything currently queued on an event receiver

#![allow(dead_code)]

pub mod scripted_loader;

pub use scripted_loader::{settle, LoadOutcome, MediaLog, ScriptedLoader};

use madrasa_common::events::MediaEvent;
use tokio::sync::broadcast;

/// Collect all events currently buffered on `rx`
pub fn drain_events(rx: &mut broadcast::Receiver<MediaEvent>) -> Vec<MediaEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
