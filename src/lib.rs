//! Belief propagation for hierarchical Gaussian filters.
//!
//! A [`Network`] pairs an immutable [`Topology`] with an [`AttributeStore`]
//! holding every node's beliefs. Each trial runs one prediction pass from the
//! roots to the inputs, injects the observations, then one prediction-error
//! pass back up, updating the parents' posteriors.

pub mod attributes;
pub mod config;
pub mod error;
pub mod math;
pub mod model;
pub mod topology;
pub mod trajectories;
pub mod updates;
pub mod utils;

#[cfg(feature = "python")]
pub mod python;

pub use attributes::{AttributeStore, Field, NodeAttributes};
pub use config::{NetworkConfig, UpdateType};
pub use error::{HgfError, Result};
pub use math::CouplingKind;
pub use model::{Network, NetworkBuilder};
pub use topology::{AdjacencyLists, NodeKind, Topology};
pub use trajectories::NodeTrajectories;
