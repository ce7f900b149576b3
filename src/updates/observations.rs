use crate::attributes::AttributeStore;

/// Inject a new observation into an input node
///
/// Writes the observed value into the node's mean and marks the node as
/// observed. A missing observation (`None`) sets the mean to the node's prior
/// expectation and marks it unobserved, so its parents skip it in the
/// posterior update.
///
/// # Arguments
/// * `attributes` - The network's attribute store.
/// * `node_idx` - The input node index.
/// * `observation` - The new observation, if any.
pub fn observation_update(attributes: &mut AttributeStore, node_idx: usize, observation: Option<f64>) {
    let node = &mut attributes[node_idx];
    match observation {
        Some(value) => {
            node.mean = value;
            node.observed = 1.0;
        }
        None => {
            node.mean = node.expected_mean;
            node.observed = 0.0;
        }
    }
}
