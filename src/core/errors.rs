use thiserror::Error;

/// Errors raised by the simulation engine and its drivers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// A caller supplied parameters the engine cannot run with
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The value carried from the previous box does not name a box
    #[error("chain value {value} is outside 1..={boxes}")]
    ChainOutOfRange { value: u32, boxes: u32 },
    /// A box number could not be found among the initialized boxes
    #[error("box {0} not found")]
    BoxNotFound(u32),
    /// A batch could not be scheduled
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
