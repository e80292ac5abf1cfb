//! Runtime configuration.
//!
//! Handles loading and validating `rastermill.toml`. Every value has a stock
//! default; user config files only override what they want to change, and
//! unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [classifier]
//! transparency_threshold = 0.1  # non-opaque fraction that forces PNG output
//! flat_variance = 30.0          # color spread below this = flat content
//! moderate_variance = 60.0      # color spread below this = moderate detail
//! flat_quality = 0.70           # quality tier for flat content
//! moderate_quality = 0.85       # quality tier for moderate detail
//! detailed_quality = 0.92       # quality tier for detailed content
//! transparent_quality = 1.0     # quality paired with the PNG switch
//!
//! [frames]
//! interval = 0.1                # seconds between animation frames
//! max_width = 800               # suggestion box for auto frame sizing
//! max_height = 600
//! ```
//!
//! The classifier numbers are empirical tuning constants (see
//! [`ClassifierThresholds`]); they are configuration precisely because they
//! encode no derivable truth.

use crate::transform::ClassifierThresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `rastermill.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Smart-compression decision bounds.
    pub classifier: ClassifierThresholds,
    /// Frame-sequencing defaults.
    pub frames: FramesConfig,
}

/// Defaults for frame preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramesConfig {
    /// Seconds between frames.
    pub interval: f32,
    /// Bounding box used when suggesting frame dimensions from the first
    /// input (sequential clamp, see
    /// [`fit_within`](crate::transform::fit_within)).
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            interval: 0.1,
            max_width: 800,
            max_height: 600,
        }
    }
}

impl CoreConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: CoreConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to stock defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.transparency_threshold) {
            return Err(ConfigError::Validation(
                "classifier.transparency_threshold must be in [0.0, 1.0]".into(),
            ));
        }
        if c.flat_variance < 0.0 || c.moderate_variance < 0.0 {
            return Err(ConfigError::Validation(
                "classifier variance bounds must be non-negative".into(),
            ));
        }
        if c.flat_variance >= c.moderate_variance {
            return Err(ConfigError::Validation(
                "classifier.flat_variance must be below moderate_variance".into(),
            ));
        }
        for (name, value) in [
            ("flat_quality", c.flat_quality),
            ("moderate_quality", c.moderate_quality),
            ("detailed_quality", c.detailed_quality),
            ("transparent_quality", c.transparent_quality),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "classifier.{name} must be in [0.0, 1.0]"
                )));
            }
        }
        if !(self.frames.interval > 0.0) {
            return Err(ConfigError::Validation(
                "frames.interval must be positive".into(),
            ));
        }
        if self.frames.max_width == 0 || self.frames.max_height == 0 {
            return Err(ConfigError::Validation(
                "frames.max_width and max_height must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A stock `rastermill.toml` with every option documented, for `gen-config`.
pub fn stock_toml() -> &'static str {
    r#"# rastermill configuration
# All options are optional - the values below are the defaults.

[classifier]
# Smart-compression decision bounds. These are empirical tuning constants:
# adjust them against your own corpus, there is no derivation behind them.

# Fraction of non-opaque sampled pixels above which output switches to PNG
# to preserve transparency.
transparency_threshold = 0.1

# Mean per-pixel color spread below which content counts as flat
# (solid fills, screenshots, diagrams) or moderately detailed.
flat_variance = 30.0
moderate_variance = 60.0

# Quality tier applied per bucket.
flat_quality = 0.70
moderate_quality = 0.85
detailed_quality = 0.92

# Quality paired with the PNG switch for transparent content.
transparent_quality = 1.0

[frames]
# Seconds between animation frames.
interval = 0.1

# Bounding box used when suggesting frame dimensions from the first input.
max_width = 800
max_height = 600
"#
}
