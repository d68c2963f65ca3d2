pub mod core;

// Re-export commonly used types
pub use crate::core::errors::SimulationError;
pub use crate::core::execution::{BatchReport, BatchRunner, ConcurrencyMode, SimulationConfig, SimulationEngine, SimulationObserver};
pub use crate::core::types::{NumberedBox, RunId, RunSummary, SimulationStatus, StepResult};
