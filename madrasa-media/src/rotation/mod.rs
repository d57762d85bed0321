//! Carousel rotation: window arithmetic, timer, viewport breakpoints

pub mod breakpoints;
pub mod scheduler;
pub mod window;

pub use breakpoints::Breakpoints;
pub use scheduler::{RotationScheduler, RotationSnapshot};
pub use window::RotationWindow;
