//! View binding
//!
//! Composition root for one page section: a playback coordinator for its
//! audio buttons and a rotation scheduler for its carousel. The view layer
//! forwards raw UI events here and renders the returned snapshot.

use crate::playback::{MediaLoader, PlayableRef, PlaybackCoordinator, PlaybackSnapshot};
use crate::rotation::{Breakpoints, RotationScheduler, RotationSnapshot};
use madrasa_common::config::MadrasaConfig;
use madrasa_common::events::{EventBus, MediaEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// UI events understood by [`ViewBinding`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Play/pause button of an audio item
    PlayClicked { playable: PlayableRef },
    /// Global stop (e.g. closing a modal)
    StopClicked,
    NextClicked,
    PrevClicked,
    /// Pagination dot
    DotClicked { page: usize },
    /// Viewport width changed
    Resized { width: u32 },
    HoverStarted,
    HoverEnded,
    /// Carousel content was replaced
    ContentChanged { item_count: usize },
}

/// Everything the view needs to re-render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub playback: PlaybackSnapshot,
    pub rotation: RotationSnapshot,
}

/// Wires UI events to one coordinator and one scheduler
pub struct ViewBinding {
    playback: PlaybackCoordinator,
    rotation: RotationScheduler,
    breakpoints: Breakpoints,
    pause_on_hover: bool,
    events: EventBus,
}

impl ViewBinding {
    /// Mount a binding for `item_count` carousel items at `viewport_width`
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        config: &MadrasaConfig,
        loader: Arc<dyn MediaLoader>,
        item_count: usize,
        viewport_width: u32,
    ) -> Self {
        let events = EventBus::default();
        let breakpoints = Breakpoints::new(&config.rotation.breakpoints);
        let items_per_view = breakpoints.classify(viewport_width);

        debug!(
            "Mounting view binding: {} items, width {} -> {} per view",
            item_count, viewport_width, items_per_view
        );

        Self {
            playback: PlaybackCoordinator::new(loader, events.clone(), &config.playback),
            rotation: RotationScheduler::from_config(
                item_count,
                items_per_view,
                &config.rotation,
                events.clone(),
            ),
            breakpoints,
            pause_on_hover: config.rotation.pause_on_hover,
            events,
        }
    }

    /// Apply one UI event and return the resulting state
    ///
    /// Must be called inside a tokio runtime: play clicks spawn a load and
    /// hover events may re-arm the rotation timer. A UI thread should enter the
    /// runtime with `Handle::enter` or forward events over a channel.
    pub fn handle(&self, event: ViewEvent) -> ViewSnapshot {
        match event {
            ViewEvent::PlayClicked { playable } => {
                self.playback.toggle(playable);
            }
            ViewEvent::StopClicked => {
                self.playback.stop();
            }
            ViewEvent::NextClicked => {
                self.rotation.next();
            }
            ViewEvent::PrevClicked => {
                self.rotation.prev();
            }
            ViewEvent::DotClicked { page } => {
                self.rotation.jump_to_page(page);
            }
            ViewEvent::Resized { width } => {
                self.rotation
                    .set_items_per_view(self.breakpoints.classify(width));
            }
            ViewEvent::HoverStarted => {
                if self.pause_on_hover {
                    self.rotation.pause();
                }
            }
            ViewEvent::HoverEnded => {
                if self.pause_on_hover {
                    self.rotation.resume();
                }
            }
            ViewEvent::ContentChanged { item_count } => {
                self.rotation.set_item_count(item_count);
            }
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            playback: self.playback.snapshot(),
            rotation: self.rotation.snapshot(),
        }
    }

    /// Events from both controllers, in emission order
    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }

    pub fn playback(&self) -> &PlaybackCoordinator {
        &self.playback
    }

    pub fn rotation(&self) -> &RotationScheduler {
        &self.rotation
    }
}
