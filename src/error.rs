//! Error types for network construction and belief propagation.

use thiserror::Error;

/// Errors raised while building a network or running a trial.
///
/// Every variant is fatal to the trial in which it occurs: the scheduler never
/// commits a partially updated attribute store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HgfError {
    /// Malformed topology or configuration (cycles, dangling indices, invalid
    /// node kinds, non-finite weights, bad default values).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A computed precision is not strictly positive, or a value is not finite.
    #[error("numerical instability at node {node}: {quantity} = {value}")]
    NumericalInstability {
        node: usize,
        quantity: &'static str,
        value: f64,
    },

    /// Two lists that must be aligned have different lengths.
    #[error("shape mismatch: {what} (expected {expected}, got {found})")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid TOML for [`crate::config::NetworkConfig`].
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, HgfError>;

/// Fail with [`HgfError::NumericalInstability`] unless `value` is finite.
pub(crate) fn ensure_finite(node: usize, quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HgfError::NumericalInstability { node, quantity, value })
    }
}

/// Fail with [`HgfError::NumericalInstability`] unless `value` is finite and > 0.
pub(crate) fn ensure_positive(node: usize, quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(HgfError::NumericalInstability { node, quantity, value })
    }
}
