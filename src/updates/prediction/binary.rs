use crate::attributes::AttributeStore;
use crate::error::{ensure_positive, Result};
use crate::math::sigmoid;
use crate::topology::Topology;

/// Prediction from a binary state node
///
/// The expected mean is the probability of observing 1:
///     μ̂ = s(Σ(κ_j · g_j(μ̂_parent_j)))
///
/// and the expected precision is the inverse Bernoulli variance:
///     π̂ = 1 / (μ̂ · (1 - μ̂))
///
/// A saturated prediction (μ̂ of exactly 0 or 1) has no finite precision and
/// aborts the trial.
pub fn prediction_binary_state_node(
    topology: &Topology,
    attributes: &mut AttributeStore,
    node_idx: usize,
    _time_step: f64,
) -> Result<()> {
    let mut logit = 0.0;
    for (parent_idx, kappa, coupling_fn) in topology.value_parents(node_idx) {
        logit += kappa * (coupling_fn.f)(attributes[parent_idx].expected_mean);
    }

    let expected_mean = sigmoid(logit);
    let expected_precision = ensure_positive(
        node_idx,
        "expected_precision",
        1.0 / (expected_mean * (1.0 - expected_mean)),
    )?;

    let node = &mut attributes[node_idx];
    node.expected_mean = expected_mean;
    node.expected_precision = expected_precision;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NodeAttributes;
    use crate::error::HgfError;
    use crate::math::CouplingKind;
    use crate::topology::{AdjacencyLists, NodeKind};

    fn binary_with_parent() -> (Topology, AttributeStore) {
        let mut edges = vec![
            AdjacencyLists::new(NodeKind::Binary),
            AdjacencyLists::new(NodeKind::Continuous),
        ];
        edges[1].value_children = vec![0];
        edges[1].value_coupling_children = vec![1.0];
        edges[0].value_parents = vec![1];
        edges[0].value_coupling_parents = vec![1.0];
        edges[0].value_coupling_fn_parents = vec![CouplingKind::Linear];
        let topology = Topology::new(edges).unwrap();
        let store = AttributeStore::from_nodes(vec![NodeAttributes::default(); 2]);
        (topology, store)
    }

    #[test]
    fn test_neutral_parent_gives_fair_coin() {
        let (topology, mut store) = binary_with_parent();
        prediction_binary_state_node(&topology, &mut store, 0, 1.0).unwrap();
        assert_eq!(store[0].expected_mean, 0.5);
        assert_eq!(store[0].expected_precision, 4.0);
    }

    #[test]
    fn test_parent_prediction_is_squashed() {
        let (topology, mut store) = binary_with_parent();
        store[1].expected_mean = 1.0;
        prediction_binary_state_node(&topology, &mut store, 0, 1.0).unwrap();
        let p = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((store[0].expected_mean - p).abs() < 1e-12);
        assert!((store[0].expected_precision - 1.0 / (p * (1.0 - p))).abs() < 1e-9);
    }

    #[test]
    fn test_saturated_prediction_is_an_error() {
        let (topology, mut store) = binary_with_parent();
        store[1].expected_mean = 800.0;
        let err = prediction_binary_state_node(&topology, &mut store, 0, 1.0).unwrap_err();
        assert!(matches!(err, HgfError::NumericalInstability { node: 0, quantity: "expected_precision", .. }));
    }
}
