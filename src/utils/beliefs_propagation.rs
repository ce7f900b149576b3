use std::fmt;

use crate::attributes::AttributeStore;
use crate::error::{ensure_finite, HgfError, Result};
use crate::topology::Topology;
use crate::updates::observations::observation_update;
use crate::utils::set_sequence::UpdateSequence;

/// The two phases of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    /// Root to leaves: priors, then observations.
    Predicting,
    /// Leaves to root: posteriors and prediction errors.
    Correcting,
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialPhase::Predicting => f.write_str("predicting"),
            TrialPhase::Correcting => f.write_str("correcting"),
        }
    }
}

/// Single time slice belief propagation.
///
/// Runs the prediction steps, injects one observation per input node (in the
/// order of [`Topology::inputs`]), then runs the update steps. The attribute
/// store is mutated in place; on error it is left part-way through the trial,
/// so callers that need atomicity run this on a copy.
///
/// # Arguments
/// * `observations` - One value per input node; `None` marks a missing observation.
///   A NaN or infinite value is rejected before any step runs.
pub fn belief_propagation(
    topology: &Topology,
    attributes: &mut AttributeStore,
    observations: &[Option<f64>],
    sequence: &UpdateSequence,
    time_step: f64,
) -> Result<()> {
    if observations.len() != topology.inputs().len() {
        return Err(HgfError::ShapeMismatch {
            what: String::from("observations per trial"),
            expected: topology.inputs().len(),
            found: observations.len(),
        });
    }
    for (&idx, observation) in topology.inputs().iter().zip(observations) {
        if let Some(value) = *observation {
            ensure_finite(idx, "observation", value)?;
        }
    }

    // 1. prediction steps
    run_steps(TrialPhase::Predicting, topology, attributes, &sequence.predictions, time_step)?;

    // 2. observation steps
    for (&idx, &observation) in topology.inputs().iter().zip(observations) {
        observation_update(attributes, idx, observation);
    }

    // 3. update steps
    run_steps(TrialPhase::Correcting, topology, attributes, &sequence.updates, time_step)
}

fn run_steps(
    phase: TrialPhase,
    topology: &Topology,
    attributes: &mut AttributeStore,
    steps: &[(usize, crate::utils::function_pointer::FnType)],
    time_step: f64,
) -> Result<()> {
    for (idx, step) in steps.iter() {
        tracing::trace!(%phase, node = *idx, "update step");
        if let Err(err) = step(topology, attributes, *idx, time_step) {
            tracing::debug!(%phase, node = *idx, error = %err, "update step failed");
            return Err(err);
        }
    }
    Ok(())
}
