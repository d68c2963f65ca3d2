//! Configuration for prisoners simulation runs
//!
//! This module provides the configuration shared by the batch runner and the
//! command-line driver: problem size, seeding, pacing and concurrency settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::SimulationError;
use crate::core::execution::simulation_engine::validate_parameters;

/// Default number of prisoners (and boxes)
pub const DEFAULT_PRISONERS: u32 = 100;
/// Default number of boxes each prisoner may open
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
/// Default number of independent runs in a batch
pub const DEFAULT_TRIALS: u64 = 1000;
/// Default pause between two auto-played steps
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// Enumeration of supported concurrency modes for batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Trials run one after another on the calling thread
    Sequential,
    /// Trials are spread over a Rayon thread pool
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// Configuration for simulation execution
///
/// Every run inside one engine stays strictly sequential; the concurrency
/// settings only decide how independent trials of a batch are scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of prisoners, which is also the number of boxes
    pub prisoners: u32,
    /// Boxes a single prisoner may open during their turn
    pub max_attempts_per_prisoner: u32,
    /// Base seed; trial `i` of a batch uses `seed + i`
    pub seed: Option<u64>,
    /// Number of independent runs in a batch
    pub trials: u64,
    /// The concurrency mode to use for batches
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel batches
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
    /// Pause between steps when a driver auto-plays a run
    pub step_delay: Duration,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    ///
    /// Defaults are the classic puzzle: 100 prisoners, 50 attempts each.
    pub fn new() -> Self {
        Self {
            prisoners: DEFAULT_PRISONERS,
            max_attempts_per_prisoner: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            trials: DEFAULT_TRIALS,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    pub fn with_prisoners(mut self, prisoners: u32) -> Self {
        self.prisoners = prisoners;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts_per_prisoner = max_attempts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    /// Set the concurrency mode for batches
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel batches
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Check the configuration before any engine is built.
    ///
    /// Stricter than the engine itself: a prisoner may not open more boxes
    /// than exist.
    pub fn validate(&self) -> Result<(), SimulationError> {
        validate_parameters(self.prisoners, self.max_attempts_per_prisoner)?;
        if self.max_attempts_per_prisoner > self.prisoners {
            return Err(SimulationError::InvalidArgument(format!(
                "attempts per prisoner ({}) exceed the number of boxes ({})",
                self.max_attempts_per_prisoner, self.prisoners
            )));
        }
        if self.trials == 0 {
            return Err(SimulationError::InvalidArgument(
                "a batch needs at least one trial".to_string(),
            ));
        }
        if self.thread_pool_size == Some(0) {
            return Err(SimulationError::InvalidArgument(
                "thread pool size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
