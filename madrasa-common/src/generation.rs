//! Generation tokens for discarding stale asynchronous completions
//!
//! Every time a component hands ownership of its resource to a new request it
//! advances its counter. Asynchronous work captures the generation current at
//! the time it was started and compares it at the callback boundary; a
//! mismatch means the work was superseded and its result must be dropped.

use serde::{Deserialize, Serialize};

/// Opaque, monotonically increasing ownership token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Raw counter value (for logging)
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Issues generations for a single owner
///
/// Not synchronised on its own; it lives inside the owner's state lock.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: Generation,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation currently considered live
    pub fn current(&self) -> Generation {
        self.current
    }

    /// Invalidate every outstanding generation and return the new live one
    pub fn advance(&mut self) -> Generation {
        self.current = Generation(self.current.0.wrapping_add(1));
        self.current
    }

    /// Whether `generation` is still the live one
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == generation
    }
}
