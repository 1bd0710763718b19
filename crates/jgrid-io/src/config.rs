//! JSON configuration for the jgrid tools.
//!
//! A config file only needs the keys it changes. Loading serializes
//! [`GridConfig::default`], deep-merges the user document over it, and
//! deserializes the result, so a partial file like
//!
//! ```json
//! { "analysis": { "seed": 7 } }
//! ```
//!
//! keeps every other default.

use std::path::{Path, PathBuf};

use jgrid_algo::{AnalysisOptions, ImpedanceModel, CAPACITY_FLOOR_GW, DEFAULT_SEED};
use jgrid_core::{GridError, GridResult, DEFAULT_CAPACITY_GW};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::validate::ValidationPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Input table locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub capacity_csv: PathBuf,
    pub connections_csv: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            capacity_csv: PathBuf::from("power_capacity.csv"),
            connections_csv: PathBuf::from("connections.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seed for impedance synthesis.
    pub seed: u64,
    pub impedance_model: ImpedanceModel,
    /// Capacity substituted for operators without a capacity record.
    pub default_capacity_gw: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            impedance_model: ImpedanceModel::default(),
            default_capacity_gw: DEFAULT_CAPACITY_GW,
        }
    }
}

/// Console report formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub decimal_places: usize,
    /// Shown for off-diagonal impedance entries without a direct line.
    pub infinity_symbol: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decimal_places: 3,
            infinity_symbol: "∞".to_string(),
        }
    }
}

impl GridConfig {
    /// Load a config file, merged over the defaults.
    pub fn load_from(path: &Path) -> GridResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let overlay: Value = serde_json::from_str(&contents)
            .map_err(|e| GridError::Config(format!("{}: {e}", path.display())))?;
        Self::from_overlay(overlay)
    }

    /// Merge a JSON document over the defaults.
    pub fn from_overlay(overlay: Value) -> GridResult<Self> {
        if !overlay.is_object() {
            return Err(GridError::Config(
                "config document must be a JSON object".to_string(),
            ));
        }
        let mut merged = serde_json::to_value(Self::default())?;
        deep_merge(&mut merged, overlay);
        serde_json::from_value(merged).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Load `path` if given; any failure logs a warning and yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Write pretty JSON, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> GridResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents + "\n")?;
        Ok(())
    }

    /// Look up a value by dot-separated key, e.g. `analysis.seed`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let root = serde_json::to_value(self).ok()?;
        key.split('.')
            .filter(|part| !part.is_empty())
            .try_fold(&root, |value, part| value.get(part))
            .cloned()
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            seed: self.analysis.seed,
            model: self.analysis.impedance_model,
            capacity_floor_gw: CAPACITY_FLOOR_GW,
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            default_capacity_gw: self.analysis.default_capacity_gw,
        }
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value replaces the base value.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
