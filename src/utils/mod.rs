pub mod beliefs_propagation;
pub mod function_pointer;
pub mod set_sequence;
pub mod simulate;
