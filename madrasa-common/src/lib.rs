//! # Madrasa Common Library
//!
//! Shared code for the madrasa media controllers:
//! - Error type
//! - Event types and the in-process event bus
//! - Configuration loading
//! - Logging initialisation
//! - Generation tokens for stale-completion detection

pub mod config;
pub mod error;
pub mod events;
pub mod generation;
pub mod logging;

pub use error::{Error, Result};
pub use generation::{Generation, GenerationCounter};
