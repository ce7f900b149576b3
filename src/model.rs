use std::sync::Arc;

use crate::attributes::{AttributeStore, Field, NodeAttributes};
use crate::config::{ContinuousDefaults, NetworkConfig};
use crate::error::{HgfError, Result};
use crate::math::CouplingKind;
use crate::topology::{AdjacencyLists, NodeKind, Topology};
use crate::trajectories::NodeTrajectories;
use crate::utils::beliefs_propagation::belief_propagation;
use crate::utils::set_sequence::{set_update_sequence, UpdateSequence};

/// Incremental construction of a [`Network`].
///
/// Nodes are added children first: a new node lists the existing nodes it is
/// a parent of, and the reciprocal parent edges are written on those children.
/// Every edge starts with a coupling strength of 1.0 and a linear coupling
/// function.
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    config: NetworkConfig,
    edges: Vec<AdjacencyLists>,
    attributes: AttributeStore,
}

impl NetworkBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        NetworkBuilder {
            config,
            edges: Vec::new(),
            attributes: AttributeStore::new(),
        }
    }

    /// Number of nodes added so far.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Add nodes to the network.
    ///
    /// # Arguments
    /// * `kind` - The type of node that should be added.
    /// * `value_children` - The indexes of the node's value children.
    /// * `volatility_children` - The indexes of the node's volatility children.
    ///
    /// # Returns
    /// The index of the new node.
    pub fn add_nodes(
        &mut self,
        kind: NodeKind,
        value_children: Option<Vec<usize>>,
        volatility_children: Option<Vec<usize>>,
    ) -> Result<usize> {
        // the node ID is equal to the number of nodes already in the network
        let node_id = self.edges.len();
        let value_children = value_children.unwrap_or_default();
        let volatility_children = volatility_children.unwrap_or_default();

        for &child_idx in value_children.iter().chain(&volatility_children) {
            if child_idx >= node_id {
                return Err(HgfError::Configuration(format!(
                    "node {}: child {} does not exist yet",
                    node_id, child_idx
                )));
            }
        }

        // input nodes have no random walk of their own
        let is_input = value_children.is_empty() && volatility_children.is_empty();
        let attributes = match kind {
            NodeKind::Continuous if is_input => continuous_attributes(&self.config.input),
            NodeKind::Continuous => continuous_attributes(&self.config.continuous),
            NodeKind::Binary => NodeAttributes {
                mean: self.config.binary.mean,
                precision: self.config.binary.precision,
                expected_mean: self.config.binary.mean,
                expected_precision: self.config.binary.precision,
                ..NodeAttributes::default()
            },
        };

        // reciprocal edges on the children
        for &child_idx in &value_children {
            let child = &mut self.edges[child_idx];
            child.value_parents.push(node_id);
            child.value_coupling_parents.push(1.0);
            child.value_coupling_fn_parents.push(CouplingKind::Linear);
        }
        for &child_idx in &volatility_children {
            let child = &mut self.edges[child_idx];
            child.volatility_parents.push(node_id);
            child.volatility_coupling_parents.push(1.0);
        }

        let mut edges = AdjacencyLists::new(kind);
        edges.value_coupling_children = vec![1.0; value_children.len()];
        edges.volatility_coupling_children = vec![1.0; volatility_children.len()];
        edges.value_children = value_children;
        edges.volatility_children = volatility_children;

        self.edges.push(edges);
        self.attributes.push(attributes);
        Ok(node_id)
    }

    /// Set the strength of an existing value coupling on both of its endpoints.
    pub fn set_value_coupling(&mut self, parent_idx: usize, child_idx: usize, coupling: f64) -> Result<()> {
        let (child_pos, parent_pos) = self.value_edge(parent_idx, child_idx)?;
        self.edges[child_idx].value_coupling_parents[child_pos] = coupling;
        self.edges[parent_idx].value_coupling_children[parent_pos] = coupling;
        Ok(())
    }

    /// Set the strength of an existing volatility coupling on both of its endpoints.
    pub fn set_volatility_coupling(&mut self, parent_idx: usize, child_idx: usize, coupling: f64) -> Result<()> {
        let child_pos = position(&self.edges, child_idx, |adj| &adj.volatility_parents, parent_idx);
        let parent_pos = position(&self.edges, parent_idx, |adj| &adj.volatility_children, child_idx);
        match (child_pos, parent_pos) {
            (Some(child_pos), Some(parent_pos)) => {
                self.edges[child_idx].volatility_coupling_parents[child_pos] = coupling;
                self.edges[parent_idx].volatility_coupling_children[parent_pos] = coupling;
                Ok(())
            }
            _ => Err(missing_edge("volatility", parent_idx, child_idx)),
        }
    }

    /// Set the function applied to the parent's mean along a value coupling.
    pub fn set_coupling_fn(&mut self, parent_idx: usize, child_idx: usize, coupling_fn: CouplingKind) -> Result<()> {
        let (child_pos, _) = self.value_edge(parent_idx, child_idx)?;
        self.edges[child_idx].value_coupling_fn_parents[child_pos] = coupling_fn;
        Ok(())
    }

    /// Overwrite the initial value of one attribute.
    pub fn set_attribute(&mut self, node_idx: usize, field: Field, value: f64) -> Result<()> {
        let node = self
            .attributes
            .node_mut(node_idx)
            .ok_or_else(|| HgfError::Configuration(format!("node {} does not exist", node_idx)))?;
        node.set(field, value);
        Ok(())
    }

    /// Validate the graph and the configuration, and resolve the update sequence.
    pub fn build(self) -> Result<Network> {
        self.config.validate()?;
        let topology = Topology::new(self.edges)?;
        tracing::info!(
            nodes = topology.len(),
            inputs = topology.inputs().len(),
            update_type = ?self.config.update_type,
            "network built"
        );
        Network::new(Arc::new(topology), self.attributes, self.config)
    }

    fn value_edge(&self, parent_idx: usize, child_idx: usize) -> Result<(usize, usize)> {
        let child_pos = position(&self.edges, child_idx, |adj| &adj.value_parents, parent_idx);
        let parent_pos = position(&self.edges, parent_idx, |adj| &adj.value_children, child_idx);
        match (child_pos, parent_pos) {
            (Some(child_pos), Some(parent_pos)) => Ok((child_pos, parent_pos)),
            _ => Err(missing_edge("value", parent_idx, child_idx)),
        }
    }
}

fn continuous_attributes(defaults: &ContinuousDefaults) -> NodeAttributes {
    NodeAttributes {
        mean: defaults.mean,
        precision: defaults.precision,
        expected_mean: defaults.mean,
        expected_precision: defaults.precision,
        tonic_volatility: defaults.tonic_volatility,
        tonic_drift: defaults.tonic_drift,
        autoconnection_strength: defaults.autoconnection_strength,
        ..NodeAttributes::default()
    }
}

fn position(
    edges: &[AdjacencyLists],
    node_idx: usize,
    list: impl Fn(&AdjacencyLists) -> &Vec<usize>,
    other: usize,
) -> Option<usize> {
    edges.get(node_idx).and_then(|adj| list(adj).iter().position(|&idx| idx == other))
}

fn missing_edge(coupling: &str, parent_idx: usize, child_idx: usize) -> HgfError {
    HgfError::Configuration(format!(
        "no {} coupling from node {} to node {}",
        coupling, parent_idx, child_idx
    ))
}

/// A validated topology, its current beliefs and the resolved update sequence.
///
/// The topology is shared and never mutated. The attribute store belongs to the
/// network and only changes when a trial completes.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Arc<Topology>,
    attributes: AttributeStore,
    update_sequence: UpdateSequence,
    config: NetworkConfig,
}

impl Network {
    /// Pair a topology with an initial attribute store.
    pub fn new(topology: Arc<Topology>, attributes: AttributeStore, config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        check_store(&topology, &attributes)?;
        let update_sequence = set_update_sequence(&topology, config.update_type);
        Ok(Network {
            topology,
            attributes,
            update_sequence,
            config,
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// The beliefs after the last completed trial.
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Replace the current beliefs, e.g. to restart from a saved snapshot.
    pub fn set_attributes(&mut self, attributes: AttributeStore) -> Result<()> {
        check_store(&self.topology, &attributes)?;
        self.attributes = attributes;
        Ok(())
    }

    pub fn update_sequence(&self) -> &UpdateSequence {
        &self.update_sequence
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn inputs(&self) -> &[usize] {
        self.topology.inputs()
    }

    /// Run one trial with one observation per input node.
    ///
    /// Returns a snapshot of the updated beliefs. On error the network is left
    /// exactly as it was before the call.
    pub fn input_trial(&mut self, observations: &[f64], time_step: Option<f64>) -> Result<AttributeStore> {
        let observations: Vec<Option<f64>> = observations.iter().copied().map(Some).collect();
        self.input_trial_masked(&observations, time_step)
    }

    /// Run one trial where some inputs may be unobserved (`None`).
    pub fn input_trial_masked(&mut self, observations: &[Option<f64>], time_step: Option<f64>) -> Result<AttributeStore> {
        let time_step = time_step.unwrap_or(self.config.time_step);
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(HgfError::Configuration(format!(
                "time step must be finite and > 0, got {}",
                time_step
            )));
        }

        let mut scratch = self.attributes.clone();
        if let Err(err) = belief_propagation(&self.topology, &mut scratch, observations, &self.update_sequence, time_step) {
            tracing::error!(error = %err, "trial aborted, beliefs left unchanged");
            return Err(err);
        }
        self.attributes = scratch;
        Ok(self.attributes.clone())
    }

    /// Add a sequence of observations.
    ///
    /// # Arguments
    /// * `input_data` - One row per trial, with one observation per input node.
    /// * `time_steps` - An optional time step per trial. If `None`, every
    ///   trial uses the configured time step.
    ///
    /// # Returns
    /// The beliefs after each trial. If a trial fails, the error is returned
    /// and the network keeps the beliefs of the last successful trial.
    pub fn input_data(&mut self, input_data: &[Vec<f64>], time_steps: Option<&[f64]>) -> Result<NodeTrajectories> {
        let masked: Vec<Vec<Option<f64>>> = input_data
            .iter()
            .map(|row| row.iter().copied().map(Some).collect())
            .collect();
        self.input_data_masked(&masked, time_steps)
    }

    /// Same as [`Network::input_data`], with `None` marking missing observations.
    pub fn input_data_masked(
        &mut self,
        input_data: &[Vec<Option<f64>>],
        time_steps: Option<&[f64]>,
    ) -> Result<NodeTrajectories> {
        if let Some(time_steps) = time_steps {
            if time_steps.len() != input_data.len() {
                return Err(HgfError::ShapeMismatch {
                    what: String::from("time steps"),
                    expected: input_data.len(),
                    found: time_steps.len(),
                });
            }
        }

        let mut node_trajectories = NodeTrajectories::with_capacity(input_data.len());
        for (t, observations) in input_data.iter().enumerate() {
            let time_step = time_steps.map(|steps| steps[t]);
            tracing::debug!(trial = t, "belief propagation");
            node_trajectories.push(self.input_trial_masked(observations, time_step)?);
        }
        Ok(node_trajectories)
    }
}

fn check_store(topology: &Topology, attributes: &AttributeStore) -> Result<()> {
    if attributes.len() != topology.len() {
        return Err(HgfError::Configuration(format!(
            "attribute store has {} nodes, topology has {}",
            attributes.len(),
            topology.len()
        )));
    }
    for (idx, node) in attributes.iter().enumerate() {
        if !(node.precision.is_finite() && node.precision > 0.0) {
            return Err(HgfError::Configuration(format!(
                "node {}: initial precision must be finite and > 0, got {}",
                idx, node.precision
            )));
        }
    }
    Ok(())
}
