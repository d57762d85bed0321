//! Single-flight playback coordinator
//!
//! Owns at most one active playable. Starting another one retires the current
//! one first (its in-flight load is aborted, or its handle is paused, reset
//! and released), so two recitations can never sound together.
//!
//! Every asynchronous completion carries the [`Generation`] that was live when
//! it was started:
//! - a load that resolves after being superseded (it finished before the
//!   abort reached it) releases what it acquired and changes nothing
//! - an end signal from a retired resource is ignored
//!
//! State transitions:
//! ```text
//! Idle --request--> Loading --acquired--> Playing --end|stop--> Idle
//! Loading --request(other)--> Loading(other)
//! Playing --request(other)--> Loading(other)
//! Loading --failure|timeout--> Idle
//! ```

use crate::error::{Error, Result};
use crate::playback::loader::{MediaHandle, MediaLoader, PlayableRef};
use crate::playback::state::{PlaybackSnapshot, RequestOutcome};
use crate::task::{lock_state, OwnedTask};
use madrasa_common::config::PlaybackConfig;
use madrasa_common::events::{EventBus, MediaEvent, PlaybackPhase, StopReason};
use madrasa_common::{Generation, GenerationCounter};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Lets a playing resource report its natural end
///
/// Bound to the generation the resource was started under; once that
/// resource has been retired the signal is inert.
#[derive(Debug, Clone)]
pub struct EndSignal {
    generation: Generation,
    tx: mpsc::UnboundedSender<Generation>,
}

impl EndSignal {
    /// Report that the resource finished playing
    pub fn notify(&self) {
        // Closed channel means the coordinator is gone; nothing to do
        let _ = self.tx.send(self.generation);
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Coordinates single-flight playback of [`PlayableRef`]s
///
/// Must be created inside a tokio runtime. Dropping the coordinator disposes
/// it: the active resource is released and later completions are no-ops.
pub struct PlaybackCoordinator {
    shared: Arc<Shared>,
    loader: Arc<dyn MediaLoader>,
    acquire_timeout: Option<Duration>,
    _end_watcher: OwnedTask,
}

struct Shared {
    state: Mutex<CoordinatorState>,
    events: EventBus,
    end_tx: mpsc::UnboundedSender<Generation>,
}

#[derive(Default)]
struct CoordinatorState {
    generations: GenerationCounter,
    active: Option<ActivePlayable>,
    disposed: bool,
}

struct ActivePlayable {
    id: String,
    generation: Generation,
    stage: Stage,
}

enum Stage {
    Loading(OwnedTask),
    Playing(Box<dyn MediaHandle>),
}

impl CoordinatorState {
    fn snapshot(&self) -> PlaybackSnapshot {
        match &self.active {
            None => PlaybackSnapshot::idle(),
            Some(active) => PlaybackSnapshot {
                active_id: Some(active.id.clone()),
                phase: match active.stage {
                    Stage::Loading(_) => PlaybackPhase::Loading,
                    Stage::Playing(_) => PlaybackPhase::Playing,
                },
            },
        }
    }

    /// Whether `generation` is the load the coordinator is still waiting on
    fn awaits_load(&self, generation: Generation) -> bool {
        self.active.as_ref().is_some_and(|active| {
            active.generation == generation && matches!(active.stage, Stage::Loading(_))
        })
    }
}

impl PlaybackCoordinator {
    /// Create a coordinator acquiring media through `loader`
    pub fn new(loader: Arc<dyn MediaLoader>, events: EventBus, config: &PlaybackConfig) -> Self {
        let (end_tx, mut end_rx) = mpsc::unbounded_channel::<Generation>();
        let shared = Arc::new(Shared {
            state: Mutex::new(CoordinatorState::default()),
            events,
            end_tx,
        });

        let weak = Arc::downgrade(&shared);
        let end_watcher = OwnedTask::spawn("playback end watcher", async move {
            while let Some(generation) = end_rx.recv().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                shared.on_natural_end(generation);
            }
        });

        Self {
            shared,
            loader,
            acquire_timeout: config.acquire_timeout(),
            _end_watcher: end_watcher,
        }
    }

    /// Start, supersede or toggle playback
    ///
    /// - Requesting the playable that is currently playing stops it.
    /// - Requesting the playable that is currently loading changes nothing.
    /// - Anything else retires the active playable and starts loading this one.
    pub fn request(&self, playable: PlayableRef) -> RequestOutcome {
        let mut state = lock_state(&self.shared.state);

        if state.disposed {
            debug!("Ignoring request for '{}' on disposed coordinator", playable.id);
            return RequestOutcome::Disposed;
        }

        let same_is_playing = state
            .active
            .as_ref()
            .filter(|active| active.id == playable.id)
            .map(|active| matches!(active.stage, Stage::Playing(_)));
        match same_is_playing {
            Some(true) => {
                self.shared.retire(&mut state, StopReason::Requested);
                return RequestOutcome::Stopped;
            }
            Some(false) => {
                debug!("'{}' is already loading", playable.id);
                return RequestOutcome::AlreadyLoading;
            }
            None => {}
        }

        self.shared.retire(&mut state, StopReason::Superseded);

        let generation = state.generations.advance();
        debug!("Loading '{}' ({})", playable.id, generation);
        state.active = Some(ActivePlayable {
            id: playable.id.clone(),
            generation,
            stage: Stage::Loading(self.spawn_load(playable.clone(), generation)),
        });

        self.shared.events.emit_lossy(MediaEvent::PlaybackLoading {
            id: playable.id,
            timestamp: chrono::Utc::now(),
        });
        RequestOutcome::Loading
    }

    /// Same as [`request`](Self::request); reads better for play/pause buttons
    pub fn toggle(&self, playable: PlayableRef) -> RequestOutcome {
        self.request(playable)
    }

    /// Stop and release whatever is active
    ///
    /// Returns `false` if the coordinator was already idle.
    pub fn stop(&self) -> bool {
        let mut state = lock_state(&self.shared.state);
        self.shared.retire(&mut state, StopReason::Requested)
    }

    /// Deliver a natural-end notification directly
    ///
    /// Equivalent to [`EndSignal::notify`] but synchronous. Returns whether the
    /// notification applied to the current resource.
    pub fn on_natural_end(&self, generation: Generation) -> bool {
        self.shared.on_natural_end(generation)
    }

    /// Tear down: behaves like `stop`, then every later request is ignored
    pub fn dispose(&self) {
        let mut state = lock_state(&self.shared.state);
        if state.disposed {
            return;
        }
        state.disposed = true;
        self.shared.retire(&mut state, StopReason::Disposed);
        info!("Playback coordinator disposed");
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        lock_state(&self.shared.state).snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.shared.events.subscribe()
    }
}

impl PlaybackCoordinator {
    /// Spawn the load for `generation`; aborted when the playable is retired
    ///
    /// The loader runs in its own task so that a panicking loader surfaces as
    /// an acquisition failure instead of leaving the coordinator in Loading.
    fn spawn_load(&self, playable: PlayableRef, generation: Generation) -> OwnedTask {
        let weak = Arc::downgrade(&self.shared);
        let loader = Arc::clone(&self.loader);
        let timeout = self.acquire_timeout;

        OwnedTask::spawn("media load", async move {
            let acquisition = OwnedTask::spawn("media acquisition", {
                let playable = playable.clone();
                async move { acquire(loader.as_ref(), &playable, timeout).await }
            });

            let result = match acquisition.join().await {
                Some(Ok(result)) => result,
                Some(Err(e)) => Err(Error::Acquisition {
                    id: playable.id.clone(),
                    reason: format!("loader task failed: {}", e),
                }),
                None => return,
            };

            match weak.upgrade() {
                Some(shared) => shared.complete_acquisition(&playable, generation, result),
                None => {
                    if let Ok(mut handle) = result {
                        handle.release();
                    }
                }
            }
        })
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    /// Retire the active playable, releasing its resource
    ///
    /// Aborts the in-flight load (if any). Advancing the generation also
    /// invalidates a load that already finished and every end signal handed
    /// out so far.
    fn retire(&self, state: &mut CoordinatorState, reason: StopReason) -> bool {
        let Some(active) = state.active.take() else {
            return false;
        };
        state.generations.advance();

        match active.stage {
            Stage::Loading(mut load) => {
                load.cancel();
                debug!("Cancelled load of '{}' ({})", active.id, reason);
            }
            Stage::Playing(mut handle) => {
                handle.pause_and_reset();
                handle.release();
                debug!("Released '{}' ({})", active.id, reason);
            }
        }

        self.events.emit_lossy(MediaEvent::PlaybackStopped {
            id: active.id,
            reason,
            timestamp: chrono::Utc::now(),
        });
        true
    }

    fn complete_acquisition(
        &self,
        playable: &PlayableRef,
        generation: Generation,
        result: Result<Box<dyn MediaHandle>>,
    ) {
        let mut state = lock_state(&self.state);

        if !state.awaits_load(generation) {
            match result {
                Ok(mut handle) => {
                    warn!("Discarding stale load of '{}' ({})", playable.id, generation);
                    handle.release();
                }
                Err(e) => {
                    debug!("Ignoring failure of superseded load '{}': {}", playable.id, e);
                }
            }
            return;
        }

        let started = result.and_then(|mut handle| {
            let on_end = EndSignal {
                generation,
                tx: self.end_tx.clone(),
            };
            match handle.play(on_end) {
                Ok(()) => Ok(handle),
                Err(e) => {
                    handle.release();
                    Err(e)
                }
            }
        });

        match started {
            Ok(handle) => {
                if let Some(active) = state.active.as_mut() {
                    // The load task is the caller; let it finish
                    if let Stage::Loading(load) =
                        std::mem::replace(&mut active.stage, Stage::Playing(handle))
                    {
                        load.detach();
                    }
                }
                info!("Playing '{}' ({})", playable.id, generation);
                self.events.emit_lossy(MediaEvent::PlaybackStarted {
                    id: playable.id.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
            Err(e) => {
                if let Some(ActivePlayable {
                    stage: Stage::Loading(load),
                    ..
                }) = state.active.take()
                {
                    load.detach();
                }
                state.generations.advance();
                warn!("Could not play '{}': {}", playable.id, e);
                self.events.emit_lossy(MediaEvent::AcquisitionFailed {
                    id: playable.id.clone(),
                    reason: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    fn on_natural_end(&self, generation: Generation) -> bool {
        let mut state = lock_state(&self.state);
        let playing = state.active.as_ref().is_some_and(|active| {
            active.generation == generation && matches!(active.stage, Stage::Playing(_))
        });

        if !playing {
            debug!("Ignoring end signal from retired resource ({})", generation);
            return false;
        }
        self.retire(&mut state, StopReason::Ended)
    }
}

async fn acquire(
    loader: &dyn MediaLoader,
    playable: &PlayableRef,
    timeout: Option<Duration>,
) -> Result<Box<dyn MediaHandle>> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, loader.acquire(playable))
            .await
            .map_err(|_| Error::AcquisitionTimeout {
                id: playable.id.clone(),
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => loader.acquire(playable).await,
    }
}
