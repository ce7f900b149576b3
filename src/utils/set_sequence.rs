use std::fmt;

use crate::config::UpdateType;
use crate::topology::{NodeKind, Topology};
use crate::updates::{
    posterior::continuous::{posterior_update_continuous_state_node, posterior_update_continuous_state_node_ehgf},
    prediction::{binary::prediction_binary_state_node, continuous::prediction_continuous_state_node},
    prediction_error::{binary::prediction_error_binary_state_node, continuous::prediction_error_continuous_state_node},
};
use crate::utils::function_pointer::{get_func_map, FnType};

/// The update steps of one trial, resolved once from the topology.
#[derive(Debug, Clone, Default)]
pub struct UpdateSequence {
    /// Prediction steps, parents before children.
    pub predictions: Vec<(usize, FnType)>,
    /// Posterior and prediction-error steps, children before parents.
    pub updates: Vec<(usize, FnType)>,
}

impl UpdateSequence {
    /// `(node, function name)` pairs, predictions first.
    pub fn describe(&self) -> Vec<(usize, &'static str)> {
        let func_map = get_func_map();
        self.predictions
            .iter()
            .chain(self.updates.iter())
            .map(|(idx, func)| (*idx, func_map.get(func).copied().unwrap_or("unknown")))
            .collect()
    }
}

impl fmt::Display for UpdateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, name) in self.describe() {
            writeln!(f, "Node: {} - Function name: {}", idx, name)?;
        }
        Ok(())
    }
}

pub fn set_update_sequence(topology: &Topology, update_type: UpdateType) -> UpdateSequence {
    UpdateSequence {
        predictions: get_predictions_sequence(topology),
        updates: get_updates_sequence(topology, update_type),
    }
}

/// One prediction step per node, in topological order.
pub fn get_predictions_sequence(topology: &Topology) -> Vec<(usize, FnType)> {
    topology
        .order()
        .iter()
        .map(|&idx| {
            let step: FnType = match topology.kind(idx) {
                NodeKind::Continuous => prediction_continuous_state_node as FnType,
                NodeKind::Binary => prediction_binary_state_node as FnType,
            };
            (idx, step)
        })
        .collect()
}

/// Walk the topological order backwards. Every child is visited before its
/// parents, so when a node is reached all of its children have already sent
/// their prediction errors: the node first updates its posterior (if it has
/// children) and then sends its own prediction error (if it has parents).
pub fn get_updates_sequence(topology: &Topology, update_type: UpdateType) -> Vec<(usize, FnType)> {
    let mut updates: Vec<(usize, FnType)> = Vec::new();

    for &idx in topology.order().iter().rev() {
        let edges = topology.edges(idx);

        // --- posterior update ---------------------------------------------------
        if edges.has_children() {
            match topology.kind(idx) {
                NodeKind::Continuous => {
                    if !edges.volatility_children.is_empty() && update_type == UpdateType::Ehgf {
                        updates.push((idx, posterior_update_continuous_state_node_ehgf));
                    } else {
                        updates.push((idx, posterior_update_continuous_state_node));
                    }
                }
                // rejected by Topology::new
                NodeKind::Binary => (),
            }
        }

        // --- prediction error ---------------------------------------------------
        if edges.has_parents() {
            match topology.kind(idx) {
                NodeKind::Continuous => updates.push((idx, prediction_error_continuous_state_node)),
                NodeKind::Binary => updates.push((idx, prediction_error_binary_state_node)),
            }
        }
    }
    updates
}
