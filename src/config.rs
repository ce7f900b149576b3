//! Network configuration.
//!
//! Controls the posterior update variant, the default time step and the
//! initial attribute values given to newly created nodes. Every field has a
//! default, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! update_type = "ehgf"
//! time_step = 1.0
//!
//! [continuous]
//! tonic_volatility = -4.0
//!
//! [input]
//! precision = 1e4
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{HgfError, Result};

/// Default time step between two trials.
pub const DEFAULT_TIME_STEP: f64 = 1.0;

/// Posterior update variant for nodes that have volatility children.
///
/// Nodes with value children only always use the standard (precision first,
/// then mean) update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// Precision first, then mean divided by the posterior precision.
    #[default]
    Standard,
    /// Mean first, divided by the expected precision, then precision.
    Ehgf,
}

/// Initial attribute values for a continuous state node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuousDefaults {
    pub mean: f64,
    pub precision: f64,
    pub tonic_volatility: f64,
    pub tonic_drift: f64,
    pub autoconnection_strength: f64,
}

impl Default for ContinuousDefaults {
    fn default() -> Self {
        ContinuousDefaults {
            mean: 0.0,
            precision: 1.0,
            tonic_volatility: -4.0,
            tonic_drift: 0.0,
            autoconnection_strength: 1.0,
        }
    }
}

impl ContinuousDefaults {
    /// Defaults for continuous input nodes: no random walk of their own.
    pub fn input() -> Self {
        ContinuousDefaults {
            tonic_volatility: 0.0,
            autoconnection_strength: 0.0,
            ..ContinuousDefaults::default()
        }
    }
}

/// An `[input]` section as written, before defaults are filled in.
#[derive(Deserialize)]
struct PartialContinuousDefaults {
    mean: Option<f64>,
    precision: Option<f64>,
    tonic_volatility: Option<f64>,
    tonic_drift: Option<f64>,
    autoconnection_strength: Option<f64>,
}

impl PartialContinuousDefaults {
    fn over(self, base: ContinuousDefaults) -> ContinuousDefaults {
        ContinuousDefaults {
            mean: self.mean.unwrap_or(base.mean),
            precision: self.precision.unwrap_or(base.precision),
            tonic_volatility: self.tonic_volatility.unwrap_or(base.tonic_volatility),
            tonic_drift: self.tonic_drift.unwrap_or(base.tonic_drift),
            autoconnection_strength: self.autoconnection_strength.unwrap_or(base.autoconnection_strength),
        }
    }
}

/// Missing keys of `[input]` fall back to [`ContinuousDefaults::input`], not
/// to the defaults of nodes with children.
fn input_defaults<'de, D>(deserializer: D) -> std::result::Result<ContinuousDefaults, D::Error>
where
    D: Deserializer<'de>,
{
    PartialContinuousDefaults::deserialize(deserializer).map(|partial| partial.over(ContinuousDefaults::input()))
}

/// Initial attribute values for a binary state node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryDefaults {
    pub mean: f64,
    pub precision: f64,
}

impl Default for BinaryDefaults {
    fn default() -> Self {
        BinaryDefaults { mean: 0.5, precision: 1.0 }
    }
}

/// Configuration shared by every node of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub update_type: UpdateType,
    pub time_step: f64,
    /// Defaults for continuous nodes that have children.
    pub continuous: ContinuousDefaults,
    /// Defaults for continuous nodes without children.
    #[serde(deserialize_with = "input_defaults")]
    pub input: ContinuousDefaults,
    pub binary: BinaryDefaults,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            update_type: UpdateType::Standard,
            time_step: DEFAULT_TIME_STEP,
            continuous: ContinuousDefaults::default(),
            input: ContinuousDefaults::input(),
            binary: BinaryDefaults::default(),
        }
    }
}

impl NetworkConfig {
    /// Configuration with the given update type and every other field at its default.
    pub fn with_update_type(update_type: UpdateType) -> Self {
        NetworkConfig { update_type, ..NetworkConfig::default() }
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NetworkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Reject values that would make the first trial fail or be meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(HgfError::Configuration(format!(
                "time_step must be finite and > 0, got {}",
                self.time_step
            )));
        }
        for (section, defaults) in [("continuous", &self.continuous), ("input", &self.input)] {
            let values = [
                defaults.mean,
                defaults.precision,
                defaults.tonic_volatility,
                defaults.tonic_drift,
                defaults.autoconnection_strength,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(HgfError::Configuration(format!(
                    "[{}] contains a non-finite value",
                    section
                )));
            }
            if defaults.precision <= 0.0 {
                return Err(HgfError::Configuration(format!(
                    "[{}] precision must be > 0, got {}",
                    section, defaults.precision
                )));
            }
        }
        if !(self.binary.mean.is_finite() && self.binary.precision.is_finite() && self.binary.precision > 0.0) {
            return Err(HgfError::Configuration(String::from(
                "[binary] mean must be finite and precision > 0",
            )));
        }
        Ok(())
    }
}
