#[cfg(any(test, feature = "test-support"))]
pub mod builder;
pub mod errors;
pub mod execution;
pub mod permutation;
pub mod state;
pub mod types;
