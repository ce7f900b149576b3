use std::collections::HashMap;

use crate::attributes::AttributeStore;
use crate::error::Result;
use crate::topology::Topology;
use crate::updates::{
    posterior::continuous::{posterior_update_continuous_state_node, posterior_update_continuous_state_node_ehgf},
    prediction::{binary::prediction_binary_state_node, continuous::prediction_continuous_state_node},
    prediction_error::{binary::prediction_error_binary_state_node, continuous::prediction_error_continuous_state_node},
};

// Create a default signature for update functions
pub type FnType = fn(&Topology, &mut AttributeStore, usize, f64) -> Result<()>;

pub fn get_func_map() -> HashMap<FnType, &'static str> {
    let function_map: HashMap<FnType, &str> = [
        (prediction_continuous_state_node as FnType, "prediction_continuous_state_node"),
        (prediction_binary_state_node as FnType, "prediction_binary_state_node"),
        (prediction_error_continuous_state_node as FnType, "prediction_error_continuous_state_node"),
        (prediction_error_binary_state_node as FnType, "prediction_error_binary_state_node"),
        (posterior_update_continuous_state_node as FnType, "posterior_update_continuous_state_node"),
        (posterior_update_continuous_state_node_ehgf as FnType, "posterior_update_continuous_state_node_ehgf"),
    ]
    .into_iter()
    .collect();
    function_map
}
