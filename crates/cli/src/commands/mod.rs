pub mod instructions;
pub mod transform;
