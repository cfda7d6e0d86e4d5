//! Dashboard configuration
//!
//! Read from `<config_dir>/xpboard/config.toml`. Every field has a default, so
//! a partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::analytics::CohortMap;
use crate::charts::{Canvas, ChartSlot, Palette};
use crate::error::CoreError;
use crate::transport::http::DEFAULT_ENDPOINT;

/// Palette given by name ("default", "high-contrast") or as a full table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteSetting {
    Named(String),
    Custom(Palette),
}

impl Default for PaletteSetting {
    fn default() -> Self {
        PaletteSetting::Named("default".to_string())
    }
}

/// Settings shared by the library and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// GraphQL endpoint
    pub endpoint: String,
    pub refresh_interval_secs: u64,
    /// Lifetime of cached query results
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    /// Where `render` writes `<slot>.svg`
    pub output_dir: PathBuf,
    pub palette: PaletteSetting,
    /// Level-distribution event ids and their display names
    pub cohorts: CohortMap,
    /// Canvas overrides keyed by slot id ("top_skills", ...)
    pub canvas: HashMap<String, Canvas>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            refresh_interval_secs: 60,
            cache_ttl_secs: 300,
            request_timeout_secs: 30,
            output_dir: PathBuf::from("xpboard-charts"),
            palette: PaletteSetting::default(),
            cohorts: CohortMap::default(),
            canvas: HashMap::new(),
        }
    }
}

impl DashboardConfig {
    /// `<config_dir>/xpboard/config.toml`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xpboard").join("config.toml"))
    }

    /// Parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::InvalidConfig {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(CoreError::InvalidConfig {
                message: format!("endpoint must be an http(s) URL, got {:?}", self.endpoint),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(CoreError::InvalidConfig {
                message: "refresh_interval_secs must be positive".to_string(),
            });
        }
        if self.cohorts.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "at least one cohort is required".to_string(),
            });
        }
        if let PaletteSetting::Named(name) = &self.palette {
            if Palette::named(name).is_none() {
                return Err(CoreError::InvalidConfig {
                    message: format!("unknown palette {:?}", name),
                });
            }
        }
        for (key, canvas) in &self.canvas {
            if !ChartSlot::ALL.iter().any(|slot| slot.id() == key) {
                return Err(CoreError::InvalidConfig {
                    message: format!("unknown chart slot {:?} in [canvas]", key),
                });
            }
            if canvas.width <= 0.0 || canvas.height <= 0.0 {
                return Err(CoreError::InvalidConfig {
                    message: format!("canvas for {} must have a positive size", key),
                });
            }
        }
        Ok(())
    }

    /// Resolved palette (unknown names fall back to the default)
    pub fn palette(&self) -> Palette {
        match &self.palette {
            PaletteSetting::Named(name) => Palette::named(name).unwrap_or_default(),
            PaletteSetting::Custom(palette) => palette.clone(),
        }
    }

    /// Canvas for a slot, honoring overrides
    pub fn canvas_for(&self, slot: ChartSlot) -> Canvas {
        self.canvas
            .get(slot.id())
            .copied()
            .unwrap_or_else(|| slot.default_canvas())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
refresh_interval_secs = 120

[canvas.top_skills]
width = 600.0
height = 400.0
"#,
        )
        .unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.refresh_interval_secs, 120);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.cohorts.event_ids(), vec![20, 72, 250]);
        assert_eq!(
            config.canvas_for(ChartSlot::TopSkills),
            Canvas::new(600.0, 400.0)
        );
        assert_eq!(
            config.canvas_for(ChartSlot::CumulativeXp),
            Canvas::new(900.0, 480.0)
        );
    }

    #[test]
    fn test_custom_palette_and_cohorts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r##"
[palette]
primary = "#000000"

[[cohorts]]
event_id = 99
name = "Piscine"
color = "#123456"
"##,
        )
        .unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        let palette = config.palette();
        assert_eq!(palette.primary, "#000000");
        assert_eq!(palette.error, Palette::default().error);
        assert_eq!(config.cohorts.event_ids(), vec![99]);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "refresh_interval_secs = \"soon\"").unwrap();

        assert!(matches!(
            DashboardConfig::load(&path),
            Err(CoreError::ConfigParse { .. })
        ));
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
        assert_eq!(
            DashboardConfig::load_or_default(&dir.path().join("missing.toml")),
            DashboardConfig::default()
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = DashboardConfig::default();
        config.endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.palette = PaletteSetting::Named("neon".to_string());
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.canvas.insert("pie".to_string(), Canvas::new(10.0, 10.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = DashboardConfig::default();
        config.refresh_interval_secs = 15;
        config.save(&path).unwrap();

        assert_eq!(DashboardConfig::load(&path).unwrap(), config);
    }
}
