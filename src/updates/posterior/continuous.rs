use crate::attributes::AttributeStore;
use crate::error::{ensure_finite, ensure_positive, Result};
use crate::topology::Topology;
use crate::updates::posterior::aggregation::{value_children_terms, volatility_children_terms};

// =============================================================================
// Standard posterior update
// =============================================================================

/// Standard posterior update from a continuous state node
///
/// 1. Update posterior precision
///     π = π̂ + Σ precision terms of the children
/// 2. Update posterior mean using the **posterior** precision
///     μ = μ̂ + Σ mean terms of the children / π
///
/// With no children both sums are zero and the posterior equals the prior.
///
/// # Arguments
/// * `topology` - The network's edges.
/// * `attributes` - The network's attribute store.
/// * `node_idx` - The node index.
/// * `_time_step` - The time step (unused in this update).
///
/// # Errors
/// [`crate::HgfError::NumericalInstability`] when the posterior precision is not
/// strictly positive or the posterior mean is not finite. The node is left
/// untouched in that case.
pub fn posterior_update_continuous_state_node(
    topology: &Topology,
    attributes: &mut AttributeStore,
    node_idx: usize,
    _time_step: f64,
) -> Result<()> {

    let node = attributes[node_idx];
    let children = value_children_terms(topology, attributes, node_idx, node.mean)
        + volatility_children_terms(topology, attributes, node_idx);

    // 1. Precision update
    let posterior_precision = ensure_positive(
        node_idx,
        "precision",
        node.expected_precision + children.precision,
    )?;

    // 2. Mean update (using posterior precision)
    let posterior_mean = ensure_finite(
        node_idx,
        "mean",
        node.expected_mean + children.mean / posterior_precision,
    )?;

    let node = &mut attributes[node_idx];
    node.precision = posterior_precision;
    node.mean = posterior_mean;
    Ok(())
}

// =============================================================================
// eHGF posterior update
// =============================================================================

/// eHGF posterior update from a continuous state node
///
/// 1. Update posterior mean using the **expected** precision (anticipatory)
/// 2. Update posterior precision, with coupling-function derivatives taken at
///    the new mean
///
/// Only scheduled for nodes that have volatility children.
pub fn posterior_update_continuous_state_node_ehgf(
    topology: &Topology,
    attributes: &mut AttributeStore,
    node_idx: usize,
    _time_step: f64,
) -> Result<()> {

    let node = attributes[node_idx];
    let volatility = volatility_children_terms(topology, attributes, node_idx);

    // 1. Mean update first (using expected precision as approximation)
    let value = value_children_terms(topology, attributes, node_idx, node.mean);
    let expected_precision = ensure_positive(node_idx, "expected_precision", node.expected_precision)?;
    let posterior_mean = ensure_finite(
        node_idx,
        "mean",
        node.expected_mean + (value.mean + volatility.mean) / expected_precision,
    )?;

    // 2. Precision update
    let value = value_children_terms(topology, attributes, node_idx, posterior_mean);
    let posterior_precision = ensure_positive(
        node_idx,
        "precision",
        node.expected_precision + value.precision + volatility.precision,
    )?;

    let node = &mut attributes[node_idx];
    node.mean = posterior_mean;
    node.precision = posterior_precision;
    Ok(())
}
