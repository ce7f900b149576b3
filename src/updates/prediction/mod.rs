pub mod binary;
pub mod continuous;
