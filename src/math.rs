use serde::{Deserialize, Serialize};

/// A value-coupling function $g$ together with its first and second derivatives.
///
/// The prediction of a child reads $g(\hat\mu_{parent})$; the posterior update of
/// the parent reads $g'(\mu)$ and $g''(\mu)$ at the parent's current mean.
#[derive(Debug, Clone, Copy)]
pub struct CouplingFn {
    /// The coupling function $g(x)$.
    pub f:   fn(f64) -> f64,
    /// The first derivative $g'(x)$.
    pub df:  fn(f64) -> f64,
    /// The second derivative $g''(x)$.
    pub d2f: fn(f64) -> f64,
}

// ─── Linear ──────────────────────────────────────────────────────────────────

/// Linear (identity) coupling: $g(x) = x$.
pub fn linear(x: f64) -> f64 { x }
/// $g'(x) = 1$.
pub fn linear_d1(_x: f64) -> f64 { 1.0 }
/// $g''(x) = 0$.
pub fn linear_d2(_x: f64) -> f64 { 0.0 }
pub const LINEAR: CouplingFn = CouplingFn { f: linear, df: linear_d1, d2f: linear_d2 };

// ─── Sigmoid ─────────────────────────────────────────────────────────────────

/// Logistic sigmoid: $s(x) = 1 / (1 + e^{-x})$. Also the link function of binary nodes.
pub fn sigmoid(x: f64) -> f64 { 1.0 / (1.0 + (-x).exp()) }
/// $s'(x) = s(x)(1 - s(x))$.
pub fn sigmoid_d1(x: f64) -> f64 { let s = sigmoid(x); s * (1.0 - s) }
/// $s''(x) = s'(x)(1 - 2s(x))$.
pub fn sigmoid_d2(x: f64) -> f64 { let s = sigmoid(x); sigmoid_d1(x) * (1.0 - 2.0 * s) }
pub const SIGMOID: CouplingFn = CouplingFn { f: sigmoid, df: sigmoid_d1, d2f: sigmoid_d2 };

// ─── Tanh ────────────────────────────────────────────────────────────────────

/// Hyperbolic tangent coupling: $g(x) = \tanh(x)$.
pub fn tanh(x: f64) -> f64 { x.tanh() }
/// $1 - \tanh^2(x)$.
pub fn tanh_d1(x: f64) -> f64 { 1.0 - x.tanh().powi(2) }
/// $-2\tanh(x)(1 - \tanh^2(x))$.
pub fn tanh_d2(x: f64) -> f64 { let t = x.tanh(); -2.0 * t * (1.0 - t * t) }
pub const TANH: CouplingFn = CouplingFn { f: tanh, df: tanh_d1, d2f: tanh_d2 };

// ─── ReLU ────────────────────────────────────────────────────────────────────

/// $\max(0, x)$, with derivative 0 at $x = 0$.
pub fn relu(x: f64) -> f64 { x.max(0.0) }
/// 1 for $x > 0$, else 0.
pub fn relu_d1(x: f64) -> f64 { if x > 0.0 { 1.0 } else { 0.0 } }
/// Always 0.
pub fn relu_d2(_x: f64) -> f64 { 0.0 }
pub const RELU: CouplingFn = CouplingFn { f: relu, df: relu_d1, d2f: relu_d2 };

/// Name of a value-coupling function, as stored on an edge.
///
/// Resolved to a `&'static CouplingFn` with [`CouplingKind::functions`]; the
/// update steps never match on names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingKind {
    #[default]
    Linear,
    Sigmoid,
    Tanh,
    Relu,
}

impl CouplingKind {
    pub fn functions(self) -> &'static CouplingFn {
        match self {
            CouplingKind::Linear  => &LINEAR,
            CouplingKind::Sigmoid => &SIGMOID,
            CouplingKind::Tanh    => &TANH,
            CouplingKind::Relu    => &RELU,
        }
    }
}
