//! Precision-weighted prediction errors collected by a parent from its children.
//!
//! Every child kind supplies a precision term and a mean term. The parent's
//! posterior precision is its expected precision plus the sum of the precision
//! terms; its posterior mean is its expected mean plus the sum of the mean
//! terms divided by a precision chosen by the update variant.

use crate::attributes::{AttributeStore, NodeAttributes};
use crate::math::CouplingFn;
use crate::topology::{NodeKind, Topology};

/// Summed contributions of a set of children.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChildTerms {
    /// Added to the expected precision.
    pub precision: f64,
    /// Divided by the parent's precision, then added to the expected mean.
    pub mean: f64,
}

impl std::ops::Add for ChildTerms {
    type Output = ChildTerms;

    fn add(self, other: ChildTerms) -> ChildTerms {
        ChildTerms {
            precision: self.precision + other.precision,
            mean: self.mean + other.mean,
        }
    }
}

/// Continuous value child.
///
/// precision: π̂_c · (κ² · g'(μ)² − g''(μ) · δ_c)
/// mean:      κ · g'(μ) · π̂_c · δ_c
fn continuous_value_child(child: &NodeAttributes, kappa: f64, coupling_fn: &CouplingFn, parent_mean: f64) -> ChildTerms {
    let g_prime = (coupling_fn.df)(parent_mean);
    let g_second = (coupling_fn.d2f)(parent_mean);
    let delta = child.value_prediction_error;
    ChildTerms {
        precision: child.expected_precision * (kappa.powi(2) * g_prime.powi(2) - g_second * delta),
        mean: kappa * g_prime * child.expected_precision * delta,
    }
}

/// Binary value child.
///
/// precision: κ / π̂_c
/// mean:      κ · (μ_c − μ̂_c)
fn binary_value_child(child: &NodeAttributes, kappa: f64) -> ChildTerms {
    ChildTerms {
        precision: kappa / child.expected_precision,
        mean: kappa * (child.mean - child.expected_mean),
    }
}

/// Volatility child, with γ its effective precision and Δ its volatility
/// prediction error.
///
/// precision: ½(κγ)² + (κγ)²Δ − ½κ²γΔ
/// mean:      ½κγΔ
fn volatility_child(child: &NodeAttributes, kappa: f64) -> ChildTerms {
    let gamma = child.effective_precision;
    let delta = child.volatility_prediction_error;
    let kappa_gamma_sq = (kappa * gamma).powi(2);
    ChildTerms {
        precision: 0.5 * kappa_gamma_sq + kappa_gamma_sq * delta - 0.5 * kappa.powi(2) * gamma * delta,
        mean: 0.5 * kappa * gamma * delta,
    }
}

/// Sum of the value children's terms. Coupling-function derivatives are taken
/// at `parent_mean`. Children that were not observed in this trial contribute
/// nothing.
pub fn value_children_terms(
    topology: &Topology,
    attributes: &AttributeStore,
    node_idx: usize,
    parent_mean: f64,
) -> ChildTerms {
    let mut total = ChildTerms::default();
    for (child_idx, kappa, coupling_fn) in topology.value_children(node_idx) {
        let child = &attributes[child_idx];
        let terms = match topology.kind(child_idx) {
            NodeKind::Continuous => continuous_value_child(child, kappa, coupling_fn, parent_mean),
            NodeKind::Binary => binary_value_child(child, kappa),
        };
        total.precision += child.observed * terms.precision;
        total.mean += child.observed * terms.mean;
    }
    total
}

pub fn volatility_children_terms(topology: &Topology, attributes: &AttributeStore, node_idx: usize) -> ChildTerms {
    let mut total = ChildTerms::default();
    for (child_idx, kappa) in topology.volatility_children(node_idx) {
        let child = &attributes[child_idx];
        let terms = volatility_child(child, kappa);
        total.precision += child.observed * terms.precision;
        total.mean += child.observed * terms.mean;
    }
    total
}
