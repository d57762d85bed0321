//! Configuration loading
//!
//! All settings live in one optional TOML file. Every key has a built-in
//! default, so a missing file or a partial file never prevents startup; a
//! file that exists but cannot be parsed is reported as an error.
//!
//! Config file resolution order:
//! 1. Explicit path given by the caller
//! 2. `MADRASA_CONFIG` environment variable
//! 3. `<config dir>/madrasa/config.toml` (platform config dir via `dirs`)
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "MADRASA_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MadrasaConfig {
    pub logging: LoggingConfig,
    pub playback: PlaybackConfig,
    pub rotation: RotationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full EnvFilter string)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Playback coordinator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Upper bound on media acquisition; 0 disables the timeout
    pub acquire_timeout_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 10_000,
        }
    }
}

impl PlaybackConfig {
    pub fn acquire_timeout(&self) -> Option<Duration> {
        (self.acquire_timeout_ms > 0).then(|| Duration::from_millis(self.acquire_timeout_ms))
    }
}

/// Rotation scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Auto-advance period in milliseconds
    pub interval_ms: u64,

    /// Start auto-advancing as soon as the scheduler is mounted
    pub autoplay: bool,

    /// Suspend auto-advance while the pointer is over the carousel
    pub pause_on_hover: bool,

    /// Viewport width breakpoints, smallest first after validation
    pub breakpoints: Vec<BreakpointConfig>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            autoplay: true,
            pause_on_hover: true,
            breakpoints: default_breakpoints(),
        }
    }
}

impl RotationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// One viewport breakpoint: widths `>= min_width` show `items_per_view` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointConfig {
    pub min_width: u32,
    pub items_per_view: usize,
}

fn default_breakpoints() -> Vec<BreakpointConfig> {
    [(0, 1), (640, 2), (1024, 3), (1280, 4)]
        .into_iter()
        .map(|(min_width, items_per_view)| BreakpointConfig {
            min_width,
            items_per_view,
        })
        .collect()
}

impl MadrasaConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: MadrasaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file and load it, falling back to defaults
    ///
    /// A missing file is not an error (a warning is logged and defaults are
    /// used). A file that exists but is invalid is returned as an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match ConfigResolver::new(explicit).resolve() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges and normalise breakpoint order
    pub fn validate(&mut self) -> Result<()> {
        if self.rotation.interval_ms == 0 {
            return Err(Error::Config(
                "rotation.interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.rotation.breakpoints.is_empty() {
            return Err(Error::Config(
                "rotation.breakpoints must contain at least one entry".to_string(),
            ));
        }

        if let Some(bp) = self
            .rotation
            .breakpoints
            .iter()
            .find(|bp| bp.items_per_view == 0)
        {
            return Err(Error::Config(format!(
                "breakpoint at min_width {} has items_per_view 0",
                bp.min_width
            )));
        }

        self.rotation.breakpoints.sort_by_key(|bp| bp.min_width);
        self.rotation.breakpoints.dedup_by_key(|bp| bp.min_width);
        Ok(())
    }
}

/// Locates the config file following the resolution order above
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    explicit: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// First candidate that exists, or `None` to use built-in defaults
    ///
    /// An explicit path or env var is returned even if it does not exist, so
    /// the caller gets an I/O error instead of silently running on defaults.
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            debug!("Using explicit config path {}", path.display());
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                debug!("Using config path from {}: {}", CONFIG_ENV_VAR, path);
                return Some(PathBuf::from(path));
            }
        }

        let user_config = dirs::config_dir().map(|d| d.join("madrasa").join("config.toml"))?;
        user_config.exists().then_some(user_config)
    }
}
