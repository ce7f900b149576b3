//! Per-node numeric state.
//!
//! The store is a flat `Vec` indexed by node index. It never computes anything;
//! the update functions in [`crate::updates`] read and write it.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Name of one scalar attribute of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Mean,
    Precision,
    ExpectedMean,
    ExpectedPrecision,
    EffectivePrecision,
    ValuePredictionError,
    VolatilityPredictionError,
    Observed,
    TonicVolatility,
    TonicDrift,
    AutoconnectionStrength,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Mean,
        Field::Precision,
        Field::ExpectedMean,
        Field::ExpectedPrecision,
        Field::EffectivePrecision,
        Field::ValuePredictionError,
        Field::VolatilityPredictionError,
        Field::Observed,
        Field::TonicVolatility,
        Field::TonicDrift,
        Field::AutoconnectionStrength,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Mean => "mean",
            Field::Precision => "precision",
            Field::ExpectedMean => "expected_mean",
            Field::ExpectedPrecision => "expected_precision",
            Field::EffectivePrecision => "effective_precision",
            Field::ValuePredictionError => "value_prediction_error",
            Field::VolatilityPredictionError => "volatility_prediction_error",
            Field::Observed => "observed",
            Field::TonicVolatility => "tonic_volatility",
            Field::TonicDrift => "tonic_drift",
            Field::AutoconnectionStrength => "autoconnection_strength",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The state and parameters of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub mean: f64,
    pub precision: f64,
    pub expected_mean: f64,
    pub expected_precision: f64,
    /// γ = Ω · π̂, read by volatility parents.
    pub effective_precision: f64,
    pub value_prediction_error: f64,
    pub volatility_prediction_error: f64,
    /// 1.0 when the node received an observation in the current trial, else 0.0.
    pub observed: f64,
    pub tonic_volatility: f64,
    pub tonic_drift: f64,
    pub autoconnection_strength: f64,
}

impl Default for NodeAttributes {
    fn default() -> Self {
        NodeAttributes {
            mean: 0.0,
            precision: 1.0,
            expected_mean: 0.0,
            expected_precision: 1.0,
            effective_precision: 0.0,
            value_prediction_error: 0.0,
            volatility_prediction_error: 0.0,
            observed: 1.0,
            tonic_volatility: 0.0,
            tonic_drift: 0.0,
            autoconnection_strength: 0.0,
        }
    }
}

impl NodeAttributes {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Mean => self.mean,
            Field::Precision => self.precision,
            Field::ExpectedMean => self.expected_mean,
            Field::ExpectedPrecision => self.expected_precision,
            Field::EffectivePrecision => self.effective_precision,
            Field::ValuePredictionError => self.value_prediction_error,
            Field::VolatilityPredictionError => self.volatility_prediction_error,
            Field::Observed => self.observed,
            Field::TonicVolatility => self.tonic_volatility,
            Field::TonicDrift => self.tonic_drift,
            Field::AutoconnectionStrength => self.autoconnection_strength,
        }
    }

    pub fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Mean => &mut self.mean,
            Field::Precision => &mut self.precision,
            Field::ExpectedMean => &mut self.expected_mean,
            Field::ExpectedPrecision => &mut self.expected_precision,
            Field::EffectivePrecision => &mut self.effective_precision,
            Field::ValuePredictionError => &mut self.value_prediction_error,
            Field::VolatilityPredictionError => &mut self.volatility_prediction_error,
            Field::Observed => &mut self.observed,
            Field::TonicVolatility => &mut self.tonic_volatility,
            Field::TonicDrift => &mut self.tonic_drift,
            Field::AutoconnectionStrength => &mut self.autoconnection_strength,
        };
        *slot = value;
    }
}

/// Attributes of every node in a network, indexed by node index.
///
/// Cloning the store is how callers (and the scheduler) take a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeStore {
    nodes: Vec<NodeAttributes>,
}

impl AttributeStore {
    pub fn new() -> Self {
        AttributeStore { nodes: Vec::new() }
    }

    pub fn from_nodes(nodes: Vec<NodeAttributes>) -> Self {
        AttributeStore { nodes }
    }

    /// Append a node and return its index.
    pub fn push(&mut self, node: NodeAttributes) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read one field of one node.
    ///
    /// # Panics
    /// If `node` is out of range.
    pub fn get(&self, node: usize, field: Field) -> f64 {
        self.nodes[node].get(field)
    }

    /// Write one field of one node.
    ///
    /// # Panics
    /// If `node` is out of range.
    pub fn set(&mut self, node: usize, field: Field, value: f64) {
        self.nodes[node].set(field, value);
    }

    pub fn node(&self, node: usize) -> Option<&NodeAttributes> {
        self.nodes.get(node)
    }

    pub fn node_mut(&mut self, node: usize) -> Option<&mut NodeAttributes> {
        self.nodes.get_mut(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeAttributes> {
        self.nodes.iter()
    }
}

impl Index<usize> for AttributeStore {
    type Output = NodeAttributes;

    fn index(&self, node: usize) -> &NodeAttributes {
        &self.nodes[node]
    }
}

impl IndexMut<usize> for AttributeStore {
    fn index_mut(&mut self, node: usize) -> &mut NodeAttributes {
        &mut self.nodes[node]
    }
}
