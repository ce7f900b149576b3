//! Node update functions.
//!
//! Every function has the [`crate::utils::function_pointer::FnType`] signature
//! so it can be stored in an update sequence, except the observation update
//! which the scheduler calls directly.

pub mod observations;
pub mod posterior;
pub mod prediction;
pub mod prediction_error;
