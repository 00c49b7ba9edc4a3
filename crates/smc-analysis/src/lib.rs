pub mod structure;
pub mod indicators;
pub mod scoring;
pub mod classifier;
pub mod analyzer;

#[cfg(test)]
mod indicators_tests;

pub use analyzer::*;
pub use classifier::*;
pub use indicators::*;
pub use scoring::*;
pub use structure::*;
