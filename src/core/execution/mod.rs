pub mod batch;
pub mod config;
pub mod simulation_engine;

// Re-export commonly used types
pub use batch::{BatchReport, BatchRunner};
pub use config::{ConcurrencyMode, SimulationConfig};
pub use simulation_engine::{SimulationEngine, SimulationObserver};
