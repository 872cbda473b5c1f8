//! CLI command implementations.

pub mod features;
pub mod score;
pub mod tables;
