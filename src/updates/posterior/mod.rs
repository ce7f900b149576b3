pub mod aggregation;
pub mod continuous;
