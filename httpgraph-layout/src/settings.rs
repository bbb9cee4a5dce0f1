use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Iterations run per batch before positions are reported back
pub const DEFAULT_BATCH_ITERATIONS: usize = 5;

/// Tunables for the force-directed simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    pub scaling_ratio: f64,
    pub gravity: f64,
    pub slow_down: f64,
    pub strong_gravity_mode: bool,
    pub lin_log_mode: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            scaling_ratio: 10.0,
            gravity: 0.05,
            slow_down: 1.0,
            strong_gravity_mode: false,
            lin_log_mode: false,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.scaling_ratio.is_finite() || self.scaling_ratio <= 0.0 {
            return Err(LayoutError::InvalidSettings(format!(
                "scalingRatio must be positive, got {}",
                self.scaling_ratio
            )));
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(LayoutError::InvalidSettings(format!(
                "gravity must be non-negative, got {}",
                self.gravity
            )));
        }
        if !self.slow_down.is_finite() || self.slow_down <= 0.0 {
            return Err(LayoutError::InvalidSettings(format!(
                "slowDown must be positive, got {}",
                self.slow_down
            )));
        }
        Ok(())
    }
}

/// Partial settings as read from a user-supplied JSON file.
///
/// Fields left out fall back to whatever the layout algorithm infers for the
/// current graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverrides {
    pub scaling_ratio: Option<f64>,
    pub gravity: Option<f64>,
    pub slow_down: Option<f64>,
    pub strong_gravity_mode: Option<bool>,
    pub lin_log_mode: Option<bool>,
    pub iterations: Option<usize>,
}

impl SettingsOverrides {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn apply(&self, base: LayoutSettings) -> Result<LayoutSettings> {
        let settings = LayoutSettings {
            scaling_ratio: self.scaling_ratio.unwrap_or(base.scaling_ratio),
            gravity: self.gravity.unwrap_or(base.gravity),
            slow_down: self.slow_down.unwrap_or(base.slow_down),
            strong_gravity_mode: self.strong_gravity_mode.unwrap_or(base.strong_gravity_mode),
            lin_log_mode: self.lin_log_mode.unwrap_or(base.lin_log_mode),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn batch_iterations(&self) -> usize {
        self.iterations.unwrap_or(DEFAULT_BATCH_ITERATIONS).max(1)
    }
}
