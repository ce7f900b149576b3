use crate::attributes::AttributeStore;
use crate::error::{ensure_finite, ensure_positive, Result};
use crate::topology::Topology;

/// Prediction from a continuous state node
///
/// Compute the expected mean and expected precision of a continuous state node.
///
/// The expected mean is given by:
///     μ̂ = λ · μ + Δt · driftrate
///
/// where driftrate = ρ + Σ(ψ_j · g_j(μ̂_parent_j)) over value parents.
///
/// The expected precision is given by:
///     π̂ = 1 / (1/π + Ω)
///
/// where the predicted volatility Ω is:
///     Ω = Δt · exp(ω + Σ(κ_j · μ_parent_j))
///
/// The effective precision γ is:
///     γ = Ω · π̂
///
/// Input nodes without volatility parents keep π̂ = π.
///
/// # Arguments
/// * `topology` - The network's edges.
/// * `attributes` - The network's attribute store.
/// * `node_idx` - The node index.
/// * `time_step` - The time elapsed since the previous trial.
pub fn prediction_continuous_state_node(
    topology: &Topology,
    attributes: &mut AttributeStore,
    node_idx: usize,
    time_step: f64,
) -> Result<()> {

    let node = attributes[node_idx];

    // -------------------------------------------------------
    // 1. Predict the mean: μ̂ = λ · μ + Δt · driftrate
    // -------------------------------------------------------

    // driftrate = ρ + Σ(ψ_j · g(μ̂_parent_j))
    let mut driftrate = node.tonic_drift;
    for (parent_idx, psi, coupling_fn) in topology.value_parents(node_idx) {
        driftrate += psi * (coupling_fn.f)(attributes[parent_idx].expected_mean);
    }

    let expected_mean = ensure_finite(
        node_idx,
        "expected_mean",
        node.autoconnection_strength * node.mean + time_step * driftrate,
    )?;

    // -------------------------------------------------------
    // 2. Predict the precision: π̂ = 1 / (1/π + Ω)
    // -------------------------------------------------------

    // total_volatility = ω + Σ(κ_j · μ_parent_j)
    let mut total_volatility = node.tonic_volatility;
    for (parent_idx, kappa) in topology.volatility_parents(node_idx) {
        total_volatility += kappa * attributes[parent_idx].mean;
    }

    let predicted_volatility = ensure_finite(
        node_idx,
        "predicted_volatility",
        time_step * total_volatility.exp(),
    )?;

    let has_volatility_parents = !topology.edges(node_idx).volatility_parents.is_empty();
    let expected_precision = if topology.is_input(node_idx) && !has_volatility_parents {
        node.precision
    } else {
        1.0 / ((1.0 / node.precision) + predicted_volatility)
    };
    let expected_precision = ensure_positive(node_idx, "expected_precision", expected_precision)?;

    // -------------------------------------------------------
    // 3. Store results
    // -------------------------------------------------------
    let node = &mut attributes[node_idx];
    node.expected_mean = expected_mean;
    node.expected_precision = expected_precision;
    node.effective_precision = predicted_volatility * expected_precision;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NodeAttributes;
    use crate::error::HgfError;
    use crate::math::CouplingKind;
    use crate::topology::{AdjacencyLists, NodeKind};

    /// node 0 (input) <- value - node 1 <- volatility - node 2
    fn three_level() -> (Topology, AttributeStore) {
        let mut edges = vec![AdjacencyLists::new(NodeKind::Continuous); 3];
        edges[1].value_children = vec![0];
        edges[1].value_coupling_children = vec![1.0];
        edges[0].value_parents = vec![1];
        edges[0].value_coupling_parents = vec![1.0];
        edges[0].value_coupling_fn_parents = vec![CouplingKind::Linear];
        edges[2].volatility_children = vec![1];
        edges[2].volatility_coupling_children = vec![1.0];
        edges[1].volatility_parents = vec![2];
        edges[1].volatility_coupling_parents = vec![1.0];
        let topology = Topology::new(edges).unwrap();

        let state = NodeAttributes {
            tonic_volatility: -4.0,
            autoconnection_strength: 1.0,
            ..NodeAttributes::default()
        };
        let store = AttributeStore::from_nodes(vec![NodeAttributes::default(), state, state]);
        (topology, store)
    }

    #[test]
    fn test_random_walk_prior() {
        let (topology, mut store) = three_level();
        store[2].mean = 0.0;
        store[1].mean = 0.3;
        store[1].tonic_drift = 0.1;
        prediction_continuous_state_node(&topology, &mut store, 1, 2.0).unwrap();

        // μ̂ = 1 · 0.3 + 2 · 0.1
        assert!((store[1].expected_mean - 0.5).abs() < 1e-12);
        // Ω = 2 · exp(-4), π̂ = 1 / (1 + Ω)
        let omega = 2.0 * (-4.0f64).exp();
        assert!((store[1].expected_precision - 1.0 / (1.0 + omega)).abs() < 1e-12);
        assert!((store[1].effective_precision - omega / (1.0 + omega)).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_parent_mean_scales_variance() {
        let (topology, mut store) = three_level();
        store[2].mean = 2.0;
        prediction_continuous_state_node(&topology, &mut store, 1, 1.0).unwrap();
        let omega = (-2.0f64).exp();
        assert!((store[1].expected_precision - 1.0 / (1.0 + omega)).abs() < 1e-12);
    }

    #[test]
    fn test_input_without_volatility_parent_keeps_precision() {
        let (topology, mut store) = three_level();
        store[0].precision = 4.0;
        store[1].expected_mean = 0.7;
        prediction_continuous_state_node(&topology, &mut store, 0, 1.0).unwrap();
        assert_eq!(store[0].expected_precision, 4.0);
        // λ = 0 for inputs, so the prior mean is the parent's prediction
        assert!((store[0].expected_mean - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_overflowing_volatility_is_an_error() {
        let (topology, mut store) = three_level();
        store[2].mean = 1e6;
        let before = store[1];
        let err = prediction_continuous_state_node(&topology, &mut store, 1, 1.0).unwrap_err();
        assert!(matches!(err, HgfError::NumericalInstability { node: 1, .. }));
        assert_eq!(store[1], before);
    }
}
