use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to encode settings TOML: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("Invalid pile configuration: {0}")]
    Invalid(String),
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Bounds and scales for one pile. Fixed for the duration of an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PileConfig {
    pub max_node_count: u32,
    pub max_curvature: f32,
    pub max_node_spacing: f32,
    pub max_width: f32,
    /// Degrees of extra roll per unit of x, gated by the curvature sign.
    pub rotation_offset: f32,
    pub origin_offset: Vec2,
}

impl Default for PileConfig {
    fn default() -> Self {
        Self {
            max_node_count: 10,
            max_curvature: 1.0,
            max_node_spacing: 100.0,
            max_width: 800.0,
            rotation_offset: 0.0,
            origin_offset: Vec2::ZERO,
        }
    }
}

impl PileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_node_count == 0 {
            return Err(ConfigError::Invalid("max_node_count must be at least 1".into()));
        }
        let scalars = [
            ("max_curvature", self.max_curvature),
            ("max_node_spacing", self.max_node_spacing),
            ("max_width", self.max_width),
            ("rotation_offset", self.rotation_offset),
            ("origin_offset.x", self.origin_offset.x),
            ("origin_offset.y", self.origin_offset.y),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if self.max_node_spacing < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_node_spacing must not be negative, got {}",
                self.max_node_spacing
            )));
        }
        if self.max_width < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_width must not be negative, got {}",
                self.max_width
            )));
        }
        Ok(())
    }
}

/// Normalized knobs a host drives, typically from sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PileControls {
    nodes_amount: f32,
    node_spacing_amount: f32,
    curvature_amount: f32,
}

impl Default for PileControls {
    fn default() -> Self {
        Self {
            nodes_amount: 0.5,
            node_spacing_amount: 1.0,
            curvature_amount: 0.0,
        }
    }
}

impl PileControls {
    pub fn new(nodes_amount: f32, node_spacing_amount: f32, curvature_amount: f32) -> Self {
        let mut controls = Self::default();
        controls.set_nodes_amount(nodes_amount);
        controls.set_node_spacing_amount(node_spacing_amount);
        controls.set_curvature_amount(curvature_amount);
        controls
    }

    pub fn nodes_amount(&self) -> f32 {
        self.nodes_amount
    }

    pub fn node_spacing_amount(&self) -> f32 {
        self.node_spacing_amount
    }

    pub fn curvature_amount(&self) -> f32 {
        self.curvature_amount
    }

    /// Clamped to `[0, 1]`.
    pub fn set_nodes_amount(&mut self, value: f32) {
        self.nodes_amount = value.clamp(0.0, 1.0);
    }

    /// Clamped to `[0, 1]`.
    pub fn set_node_spacing_amount(&mut self, value: f32) {
        self.node_spacing_amount = value.clamp(0.0, 1.0);
    }

    /// Clamped to `[-1, 1]`.
    pub fn set_curvature_amount(&mut self, value: f32) {
        self.curvature_amount = value.clamp(-1.0, 1.0);
    }

    /// Re-applies the setter clamps, for values that bypassed them (deserialization).
    pub fn clamped(self) -> Self {
        Self::new(self.nodes_amount, self.node_spacing_amount, self.curvature_amount)
    }

    /// `round(nodes_amount * max_node_count)`, ties away from zero.
    pub fn node_count(&self, config: &PileConfig) -> usize {
        (self.nodes_amount * config.max_node_count as f32).round() as usize
    }
}

/// On-disk settings document: a `[pile]` table and a `[controls]` table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PileSettings {
    pub pile: PileConfig,
    pub controls: PileControls,
}

impl PileSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut settings: PileSettings = toml::from_str(text)?;
        settings.pile.validate()?;
        settings.controls = settings.controls.clamped();
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        info!(
            "Loaded pile settings from {} (max_node_count {}, max_width {})",
            path.display(),
            settings.pile.max_node_count,
            settings.pile.max_width
        );
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
