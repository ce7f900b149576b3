use crate::attributes::AttributeStore;
use crate::error::{ensure_finite, Result};
use crate::topology::Topology;

/// Prediction error from a continuous state node
///
/// Compute the value prediction error and the volatility prediction error of a
/// continuous state node.
///
/// The value prediction error δ is given by:
///     δ = μ - μ̂
///
/// The volatility prediction error Δ is given by:
///     Δ = (π̂ / π) + π̂ · δ² - 1
///
/// δ is shared between value parents and Δ between volatility parents, so each
/// is divided by the number of parents of the corresponding type.
///
/// A node with children is observed on this trial if any of its children is,
/// so a masked input also leaves every ancestor at its prior.
pub fn prediction_error_continuous_state_node(
    topology: &Topology,
    attributes: &mut AttributeStore,
    node_idx: usize,
    _time_step: f64,
) -> Result<()> {

    let edges = topology.edges(node_idx);
    let n_value_parents = edges.value_parents.len();
    let n_volatility_parents = edges.volatility_parents.len();

    let node = attributes[node_idx];

    // 1. Value prediction error: δ = μ - μ̂
    let mut value_prediction_error = node.mean - node.expected_mean;
    if n_value_parents > 0 {
        value_prediction_error /= n_value_parents as f64;
    }

    // 2. Volatility prediction error: Δ = (π̂ / π) + π̂ · δ² - 1
    let mut volatility_prediction_error = (node.expected_precision / node.precision)
        + node.expected_precision * value_prediction_error.powi(2)
        - 1.0;
    if n_volatility_parents > 0 {
        volatility_prediction_error /= n_volatility_parents as f64;
    }

    let value_prediction_error = ensure_finite(node_idx, "value_prediction_error", value_prediction_error)?;
    let volatility_prediction_error =
        ensure_finite(node_idx, "volatility_prediction_error", volatility_prediction_error)?;

    let observed = if topology.is_input(node_idx) {
        node.observed
    } else {
        edges
            .value_children
            .iter()
            .chain(&edges.volatility_children)
            .map(|&child| attributes[child].observed)
            .fold(0.0, f64::max)
    };

    let node = &mut attributes[node_idx];
    node.value_prediction_error = value_prediction_error;
    node.volatility_prediction_error = volatility_prediction_error;
    node.observed = observed;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NodeAttributes;
    use crate::math::CouplingKind;
    use crate::topology::{AdjacencyLists, NodeKind};

    #[test]
    fn test_prediction_errors_split_between_parents() {
        // node 0 has two value parents (1, 2) and one volatility parent (3)
        let mut edges = vec![AdjacencyLists::new(NodeKind::Continuous); 4];
        for parent in [1, 2] {
            edges[parent].value_children = vec![0];
            edges[parent].value_coupling_children = vec![1.0];
            edges[0].value_parents.push(parent);
            edges[0].value_coupling_parents.push(1.0);
            edges[0].value_coupling_fn_parents.push(CouplingKind::Linear);
        }
        edges[3].volatility_children = vec![0];
        edges[3].volatility_coupling_children = vec![1.0];
        edges[0].volatility_parents = vec![3];
        edges[0].volatility_coupling_parents = vec![1.0];
        let topology = Topology::new(edges).unwrap();

        let mut store = AttributeStore::from_nodes(vec![NodeAttributes::default(); 4]);
        store[0].mean = 1.0;
        store[0].expected_mean = 0.2;
        store[0].precision = 2.0;
        store[0].expected_precision = 0.5;

        prediction_error_continuous_state_node(&topology, &mut store, 0, 1.0).unwrap();

        // δ = 0.8 / 2
        assert!((store[0].value_prediction_error - 0.4).abs() < 1e-12);
        // Δ = 0.5/2 + 0.5 · 0.16 - 1
        assert!((store[0].volatility_prediction_error - (0.25 + 0.08 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_observed_follows_children() {
        // node 1 is the value parent of input 0 and the value child of node 2
        let mut edges = vec![AdjacencyLists::new(NodeKind::Continuous); 3];
        for (child, parent) in [(0, 1), (1, 2)] {
            edges[parent].value_children = vec![child];
            edges[parent].value_coupling_children = vec![1.0];
            edges[child].value_parents = vec![parent];
            edges[child].value_coupling_parents = vec![1.0];
            edges[child].value_coupling_fn_parents = vec![CouplingKind::Linear];
        }
        let topology = Topology::new(edges).unwrap();
        let mut store = AttributeStore::from_nodes(vec![NodeAttributes::default(); 3]);

        store[0].observed = 0.0;
        prediction_error_continuous_state_node(&topology, &mut store, 0, 1.0).unwrap();
        prediction_error_continuous_state_node(&topology, &mut store, 1, 1.0).unwrap();
        assert_eq!(store[0].observed, 0.0);
        assert_eq!(store[1].observed, 0.0);

        store[0].observed = 1.0;
        prediction_error_continuous_state_node(&topology, &mut store, 1, 1.0).unwrap();
        assert_eq!(store[1].observed, 1.0);
    }
}
