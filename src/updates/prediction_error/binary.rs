use crate::attributes::AttributeStore;
use crate::error::{ensure_finite, Result};
use crate::topology::Topology;

/// Prediction error from a binary state node: δ = μ - μ̂.
///
/// The outcome is compared with the predicted probability; the parent reads the
/// realized and expected means directly, δ is stored for inspection.
pub fn prediction_error_binary_state_node(
    _topology: &Topology,
    attributes: &mut AttributeStore,
    node_idx: usize,
    _time_step: f64,
) -> Result<()> {
    let node = &mut attributes[node_idx];
    node.value_prediction_error = ensure_finite(node_idx, "value_prediction_error", node.mean - node.expected_mean)?;
    Ok(())
}
