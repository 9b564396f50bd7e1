//! Slider configuration.
//!
//! Stored as JSON; missing keys take their defaults, so older files keep
//! loading as options are added.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::constraints::SelectionConstraints;
use crate::error::TrimError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Shortest legal selection, seconds.
    pub min_space_seconds: f64,
    /// Longest legal selection, seconds. 0 = unbounded.
    pub max_space_seconds: f64,
    /// Gates the playhead's own drag gesture only.
    pub is_playhead_draggable: bool,
    /// Accepted and stored, not consumed by any behaviour yet.
    pub is_playhead_sticky: bool,
    /// Grab width of each range handle.
    pub handle_hit_width_px: f64,
    /// Grab width of the playhead.
    pub playhead_hit_width_px: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            min_space_seconds: 1.0,
            max_space_seconds: 0.0,
            is_playhead_draggable: true,
            is_playhead_sticky: false,
            handle_hit_width_px: 20.0,
            playhead_hit_width_px: 10.0,
        }
    }
}

impl TrimConfig {
    pub fn constraints(&self) -> SelectionConstraints {
        SelectionConstraints::new(self.min_space_seconds, self.max_space_seconds)
    }

    /// Reject spacing the solver cannot use. A maximum below the minimum
    /// is allowed (the minimum wins) but logged.
    pub fn validate(&self) -> std::result::Result<(), TrimError> {
        for (name, value) in [
            ("min_space_seconds", self.min_space_seconds),
            ("max_space_seconds", self.max_space_seconds),
            ("handle_hit_width_px", self.handle_hit_width_px),
            ("playhead_hit_width_px", self.playhead_hit_width_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TrimError::InvalidConfig(format!("{} must be >= 0, got {}", name, value)));
            }
        }
        if self.max_space_seconds > 0.0 && self.max_space_seconds < self.min_space_seconds {
            warn!(
                "max_space_seconds ({}) < min_space_seconds ({}): minimum takes precedence",
                self.max_space_seconds, self.min_space_seconds
            );
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load if the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = TrimConfig::default();
        assert_eq!(c.min_space_seconds, 1.0);
        assert_eq!(c.max_space_seconds, 0.0);
        assert!(c.is_playhead_draggable);
        assert!(!c.is_playhead_sticky);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: TrimConfig = serde_json::from_str(r#"{ "max_space_seconds": 30.0 }"#).unwrap();
        assert_eq!(c.max_space_seconds, 30.0);
        assert_eq!(c.min_space_seconds, 1.0);
        assert_eq!(c.constraints(), SelectionConstraints::new(1.0, 30.0));
    }

    #[test]
    fn test_negative_spacing_rejected() {
        let c = TrimConfig {
            min_space_seconds: -1.0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(TrimError::InvalidConfig(_))));
    }

    #[test]
    fn test_max_below_min_accepted() {
        let c = TrimConfig {
            min_space_seconds: 5.0,
            max_space_seconds: 2.0,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_save_load_file() {
        let dir = std::env::temp_dir().join(format!("trimrange-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trimrange.json");

        let c = TrimConfig {
            min_space_seconds: 2.5,
            is_playhead_draggable: false,
            ..Default::default()
        };
        c.save(&path).unwrap();
        assert_eq!(TrimConfig::load(&path).unwrap(), c);

        let missing = dir.join("missing.json");
        assert_eq!(TrimConfig::load_or_default(&missing).unwrap(), TrimConfig::default());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
