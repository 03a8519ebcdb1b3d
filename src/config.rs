//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mindflow/mindflow.toml`
//! 3. Explicit config file (`--config <path>`)
//! 4. Environment variables: `MINDFLOW_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Geometry tunables for the layout engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Height of a node box; the smallest vertical slot a leaf can claim
    pub min_node_height: f64,
    /// Vertical padding added to every leaf slot
    pub padding: f64,
    /// Width of a node box (used for drop hit-testing)
    pub node_width: f64,
    /// Horizontal distance between a parent and a new child
    pub horizontal_offset: f64,
    /// Vertical distance between a new child and the previous last sibling
    pub sibling_gap: f64,
    /// Re-layout moves smaller than this are skipped
    pub reposition_epsilon: f64,
    /// Where the root is placed when a map is created
    pub root_x: f64,
    pub root_y: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_node_height: 30.0,
            padding: 20.0,
            node_width: 100.0,
            horizontal_offset: 150.0,
            sibling_gap: 50.0,
            reposition_epsilon: 1.0,
            root_x: 400.0,
            root_y: 300.0,
        }
    }
}

impl LayoutSettings {
    /// Vertical slot claimed by a leaf.
    pub fn leaf_space(&self) -> f64 {
        self.min_node_height + self.padding
    }
}

/// Scoring tunables for directional navigation and drop targeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationSettings {
    /// Max horizontal deviation for up/down moves
    pub vertical_threshold: f64,
    /// Upper bound of the adaptive horizontal threshold
    pub horizontal_threshold_cap: f64,
    /// Closest-distance multiplier for the adaptive horizontal threshold
    pub horizontal_threshold_scale: f64,
    /// Horizontal threshold floor when a near candidate is parent or child
    pub structural_threshold_floor: f64,
    /// Pools up to this size count as sparse
    pub sparse_pool_size: usize,
    pub sparse_vertical_threshold: f64,
    pub sparse_horizontal_threshold: f64,
    /// Score multiplier for the direct parent or a direct child on horizontal moves
    pub structural_bonus: f64,
    /// Distance normalisation for the distance term of the score
    pub distance_norm: f64,
    /// Slack around a node box that still counts as a drop on it
    pub drop_tolerance: f64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            vertical_threshold: 100.0,
            horizontal_threshold_cap: 400.0,
            horizontal_threshold_scale: 1.5,
            structural_threshold_floor: 500.0,
            sparse_pool_size: 2,
            sparse_vertical_threshold: 150.0,
            sparse_horizontal_threshold: 300.0,
            structural_bonus: 0.7,
            distance_norm: 1000.0,
            drop_tolerance: 10.0,
        }
    }
}

/// Unified configuration for mindflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutSettings,
    pub navigation: NavigationSettings,
}

/// Get the XDG config directory for mindflow.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mindflow").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mindflow.toml"))
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line (must exist)
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), explicit)
    }

    /// Load settings from the given files plus `MINDFLOW_*` environment overrides.
    ///
    /// Split from [`Settings::load`] so callers can point at files other than
    /// the XDG location.
    pub fn load_from(global: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Config::builder();

        if let Some(path) = global {
            debug!("load: global config {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            debug!("load: explicit config {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("MINDFLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject non-finite or non-positive lengths.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let layout = &self.layout;
        let nav = &self.navigation;
        let positive = [
            ("layout.min_node_height", layout.min_node_height),
            ("layout.node_width", layout.node_width),
            ("layout.horizontal_offset", layout.horizontal_offset),
            ("layout.sibling_gap", layout.sibling_gap),
            ("navigation.vertical_threshold", nav.vertical_threshold),
            ("navigation.horizontal_threshold_cap", nav.horizontal_threshold_cap),
            ("navigation.horizontal_threshold_scale", nav.horizontal_threshold_scale),
            ("navigation.structural_threshold_floor", nav.structural_threshold_floor),
            ("navigation.sparse_vertical_threshold", nav.sparse_vertical_threshold),
            ("navigation.sparse_horizontal_threshold", nav.sparse_horizontal_threshold),
            ("navigation.structural_bonus", nav.structural_bonus),
            ("navigation.distance_norm", nav.distance_norm),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ApplicationError::Config {
                    message: format!("{name} must be a positive number, got {value}"),
                });
            }
        }
        let non_negative = [
            ("layout.padding", layout.padding),
            ("layout.reposition_epsilon", layout.reposition_epsilon),
            ("navigation.drop_tolerance", nav.drop_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ApplicationError::Config {
                    message: format!("{name} must not be negative, got {value}"),
                });
            }
        }
        if !layout.root_x.is_finite() || !layout.root_y.is_finite() {
            return Err(ApplicationError::Config {
                message: "layout.root_x/root_y must be finite".into(),
            });
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }
}
