//! Per-trial snapshots returned by [`crate::model::Network::input_data`].

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeStore, Field};

/// One attribute store per completed trial, in trial order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTrajectories {
    snapshots: Vec<AttributeStore>,
}

impl NodeTrajectories {
    pub fn with_capacity(n_trials: usize) -> Self {
        NodeTrajectories { snapshots: Vec::with_capacity(n_trials) }
    }

    pub fn push(&mut self, snapshot: AttributeStore) {
        self.snapshots.push(snapshot);
    }

    /// Number of recorded trials.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn trial(&self, trial: usize) -> Option<&AttributeStore> {
        self.snapshots.get(trial)
    }

    pub fn last(&self) -> Option<&AttributeStore> {
        self.snapshots.last()
    }

    pub fn snapshots(&self) -> &[AttributeStore] {
        &self.snapshots
    }

    /// The time series of one field of one node, or `None` if the node does
    /// not exist.
    pub fn field(&self, node: usize, field: Field) -> Option<Vec<f64>> {
        self.snapshots
            .iter()
            .map(|snapshot| snapshot.node(node).map(|attributes| attributes.get(field)))
            .collect()
    }
}
