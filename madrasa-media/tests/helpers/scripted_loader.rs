//! Scripted media loader for coordinator tests
//!
//! Every `acquire` call parks until the test resolves it, so tests control the
//! exact order in which loads complete. A load the coordinator aborts shows
//! up in [`ScriptedLoader::cancelled`]. Handles record what happens to them in
//! a shared [`MediaLog`].

use async_trait::async_trait;
use madrasa_media::{EndSignal, Error, MediaHandle, MediaLoader, PlayableRef, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// How a parked load should complete
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Hand back a working handle
    Ready,
    /// Fail acquisition with this reason
    Fail(String),
    /// Hand back a handle whose `play` fails
    PlayFails,
}

/// Per-id record of handle lifecycle calls
#[derive(Debug, Default)]
pub struct MediaLog {
    inner: Mutex<LogInner>,
}

#[derive(Debug, Default)]
struct LogInner {
    acquired: HashMap<String, usize>,
    played: HashMap<String, usize>,
    paused: HashMap<String, usize>,
    released: HashMap<String, usize>,
    sounding: HashSet<String>,
    max_sounding: usize,
    end_signals: HashMap<String, EndSignal>,
}

impl MediaLog {
    pub fn acquired(&self, id: &str) -> usize {
        *self.inner.lock().unwrap().acquired.get(id).unwrap_or(&0)
    }

    pub fn played(&self, id: &str) -> usize {
        *self.inner.lock().unwrap().played.get(id).unwrap_or(&0)
    }

    pub fn paused(&self, id: &str) -> usize {
        *self.inner.lock().unwrap().paused.get(id).unwrap_or(&0)
    }

    pub fn released(&self, id: &str) -> usize {
        *self.inner.lock().unwrap().released.get(id).unwrap_or(&0)
    }

    pub fn is_sounding(&self, id: &str) -> bool {
        self.inner.lock().unwrap().sounding.contains(id)
    }

    pub fn sounding_count(&self) -> usize {
        self.inner.lock().unwrap().sounding.len()
    }

    /// Highest number of simultaneously sounding handles ever observed
    pub fn max_sounding(&self) -> usize {
        self.inner.lock().unwrap().max_sounding
    }

    /// Fire the natural-end signal handed to `id`'s most recent play
    pub fn finish(&self, id: &str) {
        let signal = self
            .inner
            .lock()
            .unwrap()
            .end_signals
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("'{}' was never played", id));
        signal.notify();
    }

    fn record_acquired(&self, id: &str) {
        *self.inner.lock().unwrap().acquired.entry(id.to_string()).or_default() += 1;
    }
}

struct RecordingHandle {
    id: String,
    log: Arc<MediaLog>,
    fail_play: bool,
}

impl MediaHandle for RecordingHandle {
    fn play(&mut self, on_end: EndSignal) -> Result<()> {
        if self.fail_play {
            return Err(Error::Playback(format!("'{}' refused to start", self.id)));
        }
        let mut log = self.log.inner.lock().unwrap();
        *log.played.entry(self.id.clone()).or_default() += 1;
        log.sounding.insert(self.id.clone());
        log.max_sounding = log.max_sounding.max(log.sounding.len());
        log.end_signals.insert(self.id.clone(), on_end);
        Ok(())
    }

    fn pause_and_reset(&mut self) {
        let mut log = self.log.inner.lock().unwrap();
        *log.paused.entry(self.id.clone()).or_default() += 1;
        log.sounding.remove(&self.id);
    }

    fn release(&mut self) {
        let mut log = self.log.inner.lock().unwrap();
        *log.released.entry(self.id.clone()).or_default() += 1;
        log.sounding.remove(&self.id);
    }
}

/// Loader whose loads complete only when the test says so
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    pending: Arc<Mutex<HashMap<String, VecDeque<oneshot::Sender<LoadOutcome>>>>>,
    log: Arc<MediaLog>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<MediaLog> {
        Arc::clone(&self.log)
    }

    /// Number of loads for `id` still parked
    pub fn pending(&self, id: &str) -> usize {
        self.pending
            .lock()
            .unwrap()
            .get(id)
            .map_or(0, VecDeque::len)
    }

    /// Number of parked loads for `id` whose caller has gone away
    pub fn cancelled(&self, id: &str) -> usize {
        self.pending
            .lock()
            .unwrap()
            .get(id)
            .map_or(0, |senders| senders.iter().filter(|tx| tx.is_closed()).count())
    }

    /// Complete the oldest parked load for `id`, then let the runtime settle
    pub async fn resolve(&self, id: &str, outcome: LoadOutcome) {
        for _ in 0..1000 {
            let sender = self
                .pending
                .lock()
                .unwrap()
                .get_mut(id)
                .and_then(VecDeque::pop_front);
            if let Some(sender) = sender {
                let _ = sender.send(outcome);
                settle().await;
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("no pending load for '{}'", id);
    }
}

#[async_trait]
impl MediaLoader for ScriptedLoader {
    async fn acquire(&self, playable: &PlayableRef) -> Result<Box<dyn MediaHandle>> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .entry(playable.id.clone())
            .or_default()
            .push_back(tx);

        let acquisition_error = |reason: String| Error::Acquisition {
            id: playable.id.clone(),
            reason,
        };

        match rx.await {
            Ok(LoadOutcome::Ready) => {
                self.log.record_acquired(&playable.id);
                Ok(Box::new(RecordingHandle {
                    id: playable.id.clone(),
                    log: Arc::clone(&self.log),
                    fail_play: false,
                }))
            }
            Ok(LoadOutcome::PlayFails) => {
                self.log.record_acquired(&playable.id);
                Ok(Box::new(RecordingHandle {
                    id: playable.id.clone(),
                    log: Arc::clone(&self.log),
                    fail_play: true,
                }))
            }
            Ok(LoadOutcome::Fail(reason)) => Err(acquisition_error(reason)),
            Err(_) => Err(acquisition_error("load abandoned".to_string())),
        }
    }
}

/// Yield enough times for spawned completions and end watchers to run
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
