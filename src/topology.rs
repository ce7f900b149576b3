//! Static description of the node graph.
//!
//! A [`Topology`] is validated once at construction and never mutated
//! afterwards. It holds indices and coupling weights only, so it can be shared
//! (`Arc<Topology>`) by any number of networks, including across threads.

use std::fmt;
use std::str::FromStr;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::{HgfError, Result};
use crate::math::{CouplingFn, CouplingKind};

/// The kind of a node. Selects the prediction, prediction-error and posterior
/// functions used for it, and how it contributes to its parents' posteriors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "continuous-state")]
    Continuous,
    #[serde(rename = "binary-state")]
    Binary,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Continuous => "continuous-state",
            NodeKind::Binary => "binary-state",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = HgfError;

    fn from_str(kind: &str) -> Result<Self> {
        match kind {
            "continuous-state" => Ok(NodeKind::Continuous),
            "binary-state" => Ok(NodeKind::Binary),
            other => Err(HgfError::Configuration(format!("unknown node kind '{}'", other))),
        }
    }
}

/// Edges of one node. Coupling weights are stored in the same order as the
/// index list they annotate, and every edge appears on both of its endpoints
/// with the same weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyLists {
    pub node_type: NodeKind,
    pub value_parents: Vec<usize>,
    pub value_children: Vec<usize>,
    pub volatility_parents: Vec<usize>,
    pub volatility_children: Vec<usize>,
    pub value_coupling_parents: Vec<f64>,
    pub value_coupling_children: Vec<f64>,
    pub volatility_coupling_parents: Vec<f64>,
    pub volatility_coupling_children: Vec<f64>,
    /// Coupling function applied to each value parent's mean, aligned with
    /// `value_parents`.
    pub value_coupling_fn_parents: Vec<CouplingKind>,
}

impl AdjacencyLists {
    /// A node of the given kind with no edges.
    pub fn new(node_type: NodeKind) -> Self {
        AdjacencyLists {
            node_type,
            value_parents: Vec::new(),
            value_children: Vec::new(),
            volatility_parents: Vec::new(),
            volatility_children: Vec::new(),
            value_coupling_parents: Vec::new(),
            value_coupling_children: Vec::new(),
            volatility_coupling_parents: Vec::new(),
            volatility_coupling_children: Vec::new(),
            value_coupling_fn_parents: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !(self.value_children.is_empty() && self.volatility_children.is_empty())
    }

    pub fn has_parents(&self) -> bool {
        !(self.value_parents.is_empty() && self.volatility_parents.is_empty())
    }
}

#[derive(Debug)]
pub struct Topology {
    edges: Vec<AdjacencyLists>,
    /// Coupling function of each value-child edge, aligned with `value_children`.
    child_coupling_fns: Vec<Vec<&'static CouplingFn>>,
    inputs: Vec<usize>,
    order: Vec<usize>,
}

impl Topology {
    /// Validate an adjacency description and precompute the topological order.
    pub fn new(edges: Vec<AdjacencyLists>) -> Result<Self> {
        for (idx, adj) in edges.iter().enumerate() {
            check_shapes(idx, adj)?;
            check_kind(idx, adj)?;
        }
        check_reciprocity(&edges)?;
        let order = topological_order(&edges)?;

        let child_coupling_fns = edges
            .iter()
            .enumerate()
            .map(|(idx, adj)| {
                adj.value_children
                    .iter()
                    .map(|&child| {
                        let child_adj = &edges[child];
                        child_adj
                            .value_parents
                            .iter()
                            .position(|&p| p == idx)
                            .map(|pos| child_adj.value_coupling_fn_parents[pos].functions())
                            .unwrap_or(CouplingKind::Linear.functions())
                    })
                    .collect()
            })
            .collect();

        let inputs = edges
            .iter()
            .enumerate()
            .filter(|(_, adj)| !adj.has_children())
            .map(|(idx, _)| idx)
            .collect();

        Ok(Topology { edges, child_coupling_fns, inputs, order })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn kind(&self, node_idx: usize) -> NodeKind {
        self.edges[node_idx].node_type
    }

    pub fn edges(&self, node_idx: usize) -> &AdjacencyLists {
        &self.edges[node_idx]
    }

    /// Nodes without children, in ascending index order. Observations are
    /// matched to inputs in this order.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Every node, parents before children.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn is_input(&self, node_idx: usize) -> bool {
        !self.edges[node_idx].has_children()
    }

    /// `(parent, coupling strength, coupling function)` for each value parent.
    pub fn value_parents(&self, node_idx: usize) -> impl Iterator<Item = (usize, f64, &'static CouplingFn)> + '_ {
        let adj = &self.edges[node_idx];
        adj.value_parents
            .iter()
            .zip(&adj.value_coupling_parents)
            .zip(&adj.value_coupling_fn_parents)
            .map(|((&parent, &kappa), kind)| (parent, kappa, kind.functions()))
    }

    /// `(child, coupling strength, coupling function)` for each value child.
    pub fn value_children(&self, node_idx: usize) -> impl Iterator<Item = (usize, f64, &'static CouplingFn)> + '_ {
        let adj = &self.edges[node_idx];
        adj.value_children
            .iter()
            .zip(&adj.value_coupling_children)
            .zip(&self.child_coupling_fns[node_idx])
            .map(|((&child, &kappa), &coupling_fn)| (child, kappa, coupling_fn))
    }

    pub fn volatility_parents(&self, node_idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let adj = &self.edges[node_idx];
        adj.volatility_parents.iter().copied().zip(adj.volatility_coupling_parents.iter().copied())
    }

    pub fn volatility_children(&self, node_idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let adj = &self.edges[node_idx];
        adj.volatility_children.iter().copied().zip(adj.volatility_coupling_children.iter().copied())
    }
}

fn shape_mismatch(node: usize, list: &str, expected: usize, found: usize) -> HgfError {
    HgfError::ShapeMismatch {
        what: format!("node {}: {}", node, list),
        expected,
        found,
    }
}

fn check_shapes(idx: usize, adj: &AdjacencyLists) -> Result<()> {
    let pairs = [
        ("value_coupling_parents", adj.value_parents.len(), adj.value_coupling_parents.len()),
        ("value_coupling_children", adj.value_children.len(), adj.value_coupling_children.len()),
        ("volatility_coupling_parents", adj.volatility_parents.len(), adj.volatility_coupling_parents.len()),
        ("volatility_coupling_children", adj.volatility_children.len(), adj.volatility_coupling_children.len()),
        ("value_coupling_fn_parents", adj.value_parents.len(), adj.value_coupling_fn_parents.len()),
    ];
    for (list, expected, found) in pairs {
        if expected != found {
            return Err(shape_mismatch(idx, list, expected, found));
        }
    }

    let weights = adj
        .value_coupling_parents
        .iter()
        .chain(&adj.value_coupling_children)
        .chain(&adj.volatility_coupling_parents)
        .chain(&adj.volatility_coupling_children);
    for weight in weights {
        if !weight.is_finite() {
            return Err(HgfError::Configuration(format!(
                "node {}: coupling strength {} is not finite",
                idx, weight
            )));
        }
    }
    Ok(())
}

fn check_kind(idx: usize, adj: &AdjacencyLists) -> Result<()> {
    if adj.node_type == NodeKind::Binary {
        if adj.has_children() {
            return Err(HgfError::Configuration(format!(
                "node {}: binary-state nodes cannot be parents",
                idx
            )));
        }
        if !adj.volatility_parents.is_empty() {
            return Err(HgfError::Configuration(format!(
                "node {}: binary-state nodes cannot have volatility parents",
                idx
            )));
        }
    }
    Ok(())
}

/// Each edge `parent -> child` must be listed by both endpoints exactly once,
/// with the same coupling strength.
fn check_reciprocity(edges: &[AdjacencyLists]) -> Result<()> {
    for (idx, adj) in edges.iter().enumerate() {
        let value_sides = [
            (&adj.value_children, &adj.value_coupling_children, "value child"),
            (&adj.value_parents, &adj.value_coupling_parents, "value parent"),
        ];
        for (list, weights, role) in value_sides {
            for (&other, &weight) in list.iter().zip(weights) {
                let other_adj = lookup(edges, idx, other)?;
                let (back, back_weights) = if role == "value child" {
                    (&other_adj.value_parents, &other_adj.value_coupling_parents)
                } else {
                    (&other_adj.value_children, &other_adj.value_coupling_children)
                };
                check_edge(idx, other, role, weight, back, back_weights)?;
                if list.iter().filter(|&&o| o == other).count() > 1 {
                    return Err(HgfError::Configuration(format!(
                        "node {} lists {} {} more than once",
                        idx, role, other
                    )));
                }
            }
        }

        let volatility_sides = [
            (&adj.volatility_children, &adj.volatility_coupling_children, "volatility child"),
            (&adj.volatility_parents, &adj.volatility_coupling_parents, "volatility parent"),
        ];
        for (list, weights, role) in volatility_sides {
            for (&other, &weight) in list.iter().zip(weights) {
                let other_adj = lookup(edges, idx, other)?;
                let (back, back_weights) = if role == "volatility child" {
                    (&other_adj.volatility_parents, &other_adj.volatility_coupling_parents)
                } else {
                    (&other_adj.volatility_children, &other_adj.volatility_coupling_children)
                };
                check_edge(idx, other, role, weight, back, back_weights)?;
                if list.iter().filter(|&&o| o == other).count() > 1 {
                    return Err(HgfError::Configuration(format!(
                        "node {} lists {} {} more than once",
                        idx, role, other
                    )));
                }
            }
        }
    }
    Ok(())
}

fn lookup(edges: &[AdjacencyLists], node: usize, other: usize) -> Result<&AdjacencyLists> {
    if other >= edges.len() {
        return Err(HgfError::Configuration(format!(
            "node {} references node {} but the network has {} nodes",
            node,
            other,
            edges.len()
        )));
    }
    if other == node {
        return Err(HgfError::Configuration(format!("node {} is coupled to itself", node)));
    }
    Ok(&edges[other])
}

fn check_edge(idx: usize, other: usize, role: &str, weight: f64, back: &[usize], back_weights: &[f64]) -> Result<()> {
    match back.iter().position(|&b| b == idx) {
        None => Err(HgfError::Configuration(format!(
            "node {} lists {} {} but the reverse edge is missing",
            idx, role, other
        ))),
        Some(pos) if back_weights[pos] != weight => Err(HgfError::Configuration(format!(
            "coupling strength between nodes {} and {} differs between endpoints ({} vs {})",
            idx, other, weight, back_weights[pos]
        ))),
        Some(_) => Ok(()),
    }
}

/// Parents before children over value and volatility edges.
fn topological_order(edges: &[AdjacencyLists]) -> Result<Vec<usize>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(edges.len(), 0);
    let indices: Vec<NodeIndex> = (0..edges.len()).map(|idx| graph.add_node(idx)).collect();
    for (idx, adj) in edges.iter().enumerate() {
        for &child in adj.value_children.iter().chain(&adj.volatility_children) {
            graph.add_edge(indices[idx], indices[child], ());
        }
    }
    toposort(&graph, None)
        .map(|sorted| sorted.into_iter().map(|n| graph[n]).collect())
        .map_err(|cycle| {
            HgfError::Configuration(format!(
                "the network contains a cycle through node {}",
                graph[cycle.node_id()]
            ))
        })
}
