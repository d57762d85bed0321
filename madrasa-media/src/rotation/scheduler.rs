//! Auto-advancing rotation scheduler
//!
//! Wraps a [`RotationWindow`] with an instance-owned interval timer. Manual
//! navigation and the timer coexist; each scheduler has at most one timer
//! outstanding, and every (re)arm cancels the previous one first.
//!
//! Autoplay and hover-pause are tracked separately: `stop` turns autoplay off,
//! `pause` only suspends the timer until `resume`.

use crate::rotation::window::RotationWindow;
use crate::task::{lock_state, spawn_interval, OwnedTask};
use madrasa_common::config::RotationConfig;
use madrasa_common::events::{EventBus, MediaEvent, RotationTrigger};
use madrasa_common::{Generation, GenerationCounter};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Shortest auto-advance period; tokio intervals reject a zero period
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Point-in-time view of the scheduler, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSnapshot {
    pub item_count: usize,
    pub items_per_view: usize,
    pub index: usize,
    pub page: usize,
    pub page_count: usize,
    pub timer_active: bool,
}

/// Rotates a window over a fixed-length sequence on a timer
pub struct RotationScheduler {
    shared: Arc<Shared>,
    interval: Duration,
}

struct Shared {
    state: Mutex<SchedulerState>,
    events: EventBus,
}

struct SchedulerState {
    window: RotationWindow,
    autoplay: bool,
    paused: bool,
    timer: Option<OwnedTask>,
    timer_generations: GenerationCounter,
}

impl SchedulerState {
    fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            item_count: self.window.item_count(),
            items_per_view: self.window.items_per_view(),
            index: self.window.index(),
            page: self.window.current_page(),
            page_count: self.window.page_count(),
            timer_active: self.timer.is_some(),
        }
    }

    /// Cancel the timer; any tick already in flight becomes stale
    fn disarm(&mut self) -> bool {
        self.timer_generations.advance();
        match self.timer.take() {
            Some(mut timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }
}

impl RotationScheduler {
    /// Create a scheduler with the timer not running
    ///
    /// `interval` is raised to at least 1ms.
    pub fn new(item_count: usize, items_per_view: usize, interval: Duration, events: EventBus) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                "Rotation interval {:?} is below the minimum, using {:?}",
                interval, MIN_INTERVAL
            );
        }
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SchedulerState {
                    window: RotationWindow::new(item_count, items_per_view),
                    autoplay: false,
                    paused: false,
                    timer: None,
                    timer_generations: GenerationCounter::new(),
                }),
                events,
            }),
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Create a scheduler from config, starting the timer when autoplay is on
    ///
    /// Starting the timer requires a tokio runtime.
    pub fn from_config(
        item_count: usize,
        items_per_view: usize,
        config: &RotationConfig,
        events: EventBus,
    ) -> Self {
        let scheduler = Self::new(item_count, items_per_view, config.interval(), events);
        if config.autoplay {
            scheduler.start();
        }
        scheduler
    }

    /// Advance one window (wrapping); returns the new index
    pub fn next(&self) -> usize {
        self.shared.apply(RotationTrigger::Manual, RotationWindow::next)
    }

    /// Go back one window (wrapping); returns the new index
    pub fn prev(&self) -> usize {
        self.shared.apply(RotationTrigger::Manual, RotationWindow::prev)
    }

    /// Jump to `index`, clamped into range; returns the new index
    pub fn jump_to(&self, index: usize) -> usize {
        self.shared
            .apply(RotationTrigger::Manual, |window| window.jump_to(index))
    }

    /// Jump to the start of pagination page `page`; returns the new index
    pub fn jump_to_page(&self, page: usize) -> usize {
        self.shared
            .apply(RotationTrigger::Manual, |window| window.jump_to_page(page))
    }

    /// Update the window size from the viewport classifier; returns the new index
    pub fn set_items_per_view(&self, items_per_view: usize) -> usize {
        self.shared.apply(RotationTrigger::Resize, |window| {
            window.set_items_per_view(items_per_view)
        })
    }

    /// Update the sequence length; returns the new index
    ///
    /// A running timer keeps running, so rotation resumes by itself once the
    /// content outgrows the window.
    pub fn set_item_count(&self, item_count: usize) -> usize {
        self.shared.apply(RotationTrigger::ContentChanged, |window| {
            window.set_item_count(item_count)
        })
    }

    /// Enable auto-advance
    ///
    /// Always replaces the previous timer, so calling it repeatedly never
    /// leaves more than one timer behind. Clears any hover pause.
    ///
    /// Spawns the timer task, so it must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut state = lock_state(&self.shared.state);
        state.autoplay = true;
        state.paused = false;
        self.arm(&mut state);
        info!("Rotation auto-advance started ({}ms)", self.interval.as_millis());
    }

    /// Disable auto-advance; returns whether a timer was running
    pub fn stop(&self) -> bool {
        let mut state = lock_state(&self.shared.state);
        state.autoplay = false;
        state.paused = false;
        let was_running = state.disarm();
        if was_running {
            info!("Rotation auto-advance stopped");
        }
        was_running
    }

    /// Suspend auto-advance (pointer entered); returns whether the timer was running
    pub fn pause(&self) -> bool {
        let mut state = lock_state(&self.shared.state);
        if !state.autoplay || state.paused {
            return false;
        }
        state.paused = true;
        debug!("Rotation paused");
        state.disarm()
    }

    /// Undo [`pause`](Self::pause); returns whether the timer is running afterwards
    ///
    /// Re-arming the timer requires a tokio runtime.
    pub fn resume(&self) -> bool {
        let mut state = lock_state(&self.shared.state);
        if state.paused {
            state.paused = false;
            if state.autoplay {
                self.arm(&mut state);
                debug!("Rotation resumed");
            }
        }
        state.timer.is_some()
    }

    pub fn is_running(&self) -> bool {
        lock_state(&self.shared.state).timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        lock_state(&self.shared.state).snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.shared.events.subscribe()
    }

    fn arm(&self, state: &mut SchedulerState) {
        state.disarm();
        let generation = state.timer_generations.current();
        state.timer = Some(spawn_interval(
            "rotation timer",
            self.interval,
            Arc::downgrade(&self.shared),
            move |shared: &Shared| shared.tick(generation),
        ));
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        let mut state = lock_state(&self.shared.state);
        state.autoplay = false;
        state.disarm();
    }
}

impl Shared {
    fn apply<F>(&self, trigger: RotationTrigger, mutate: F) -> usize
    where
        F: FnOnce(&mut RotationWindow) -> bool,
    {
        let mut state = lock_state(&self.state);
        if mutate(&mut state.window) {
            self.announce(&state.window, trigger);
        }
        state.window.index()
    }

    fn tick(&self, generation: Generation) {
        let mut state = lock_state(&self.state);
        if !state.timer_generations.is_current(generation) {
            debug!("Ignoring tick from cancelled timer ({})", generation);
            return;
        }
        if state.window.next() {
            self.announce(&state.window, RotationTrigger::Timer);
        }
    }

    fn announce(&self, window: &RotationWindow, trigger: RotationTrigger) {
        debug!("Rotation moved to {} ({})", window.index(), trigger);
        self.events.emit_lossy(MediaEvent::RotationAdvanced {
            index: window.index(),
            page: window.current_page(),
            trigger,
            timestamp: chrono::Utc::now(),
        });
    }
}
