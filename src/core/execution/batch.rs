use std::collections::BTreeMap;

use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::errors::SimulationError;
use crate::core::execution::config::{ConcurrencyMode, SimulationConfig};
use crate::core::execution::simulation_engine::SimulationEngine;
use crate::core::permutation::longest_cycle;

/// Result of one independent run inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrialOutcome {
    succeeded: bool,
    longest_cycle: usize,
}

/// Aggregated results of a batch of runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub base_seed: u64,
    pub trials: u64,
    pub successes: u64,
    /// Longest cycle length of each layout -> number of trials
    pub longest_cycle_histogram: BTreeMap<usize, u64>,
}

impl BatchReport {
    pub fn failures(&self) -> u64 {
        self.trials - self.successes
    }

    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.successes as f64 / self.trials as f64
    }
}

/// Runs many independent, seeded simulations.
///
/// Trial `i` is seeded with `base_seed + i`, so a report depends only on the
/// configuration and never on the concurrency mode.
pub struct BatchRunner {
    config: SimulationConfig,
}

impl BatchRunner {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<BatchReport, SimulationError> {
        let base_seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let trials = self.config.trials;
        info!(
            "running {} trials of {} prisoners / {} attempts ({:?}, seed {})",
            trials,
            self.config.prisoners,
            self.config.max_attempts_per_prisoner,
            self.config.concurrency_mode,
            base_seed
        );

        let outcomes: Vec<TrialOutcome> = match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => (0..trials)
                .map(|i| self.run_trial(base_seed.wrapping_add(i)))
                .collect::<Result<_, _>>()?,
            ConcurrencyMode::Rayon => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(size) = self.config.thread_pool_size {
                    builder = builder.num_threads(size);
                }
                let pool = builder
                    .build()
                    .map_err(|e| SimulationError::ExecutionFailed(e.to_string()))?;
                pool.install(|| {
                    (0..trials)
                        .into_par_iter()
                        .map(|i| self.run_trial(base_seed.wrapping_add(i)))
                        .collect::<Result<_, _>>()
                })?
            }
        };

        let mut report = BatchReport {
            base_seed,
            trials,
            successes: 0,
            longest_cycle_histogram: BTreeMap::new(),
        };
        for outcome in outcomes {
            if outcome.succeeded {
                report.successes += 1;
            }
            *report
                .longest_cycle_histogram
                .entry(outcome.longest_cycle)
                .or_insert(0) += 1;
        }

        info!(
            "batch finished: {}/{} runs succeeded ({:.2}%)",
            report.successes,
            report.trials,
            report.success_rate() * 100.0
        );
        Ok(report)
    }

    fn run_trial(&self, seed: u64) -> Result<TrialOutcome, SimulationError> {
        let mut engine = SimulationEngine::new();
        engine.initialize_seeded(
            self.config.prisoners,
            self.config.max_attempts_per_prisoner,
            seed,
        )?;
        let longest_cycle = longest_cycle(&engine.boxes());
        let summary = engine.run_to_completion();
        debug!(
            "trial seed {}: {} in {} steps, longest cycle {}",
            seed, summary.status, summary.steps, longest_cycle
        );
        Ok(TrialOutcome {
            succeeded: summary.is_success(),
            longest_cycle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_rejects_invalid_config() {
        let config = SimulationConfig::new().with_prisoners(4).with_max_attempts(5);
        assert!(matches!(
            BatchRunner::new(config),
            Err(SimulationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_full_budget_always_succeeds() {
        let config = SimulationConfig::new()
            .with_prisoners(12)
            .with_max_attempts(12)
            .with_trials(40)
            .with_seed(5);
        let report = BatchRunner::new(config).unwrap().run().unwrap();
        assert_eq!(report.trials, 40);
        assert_eq!(report.successes, 40);
        assert_eq!(report.failures(), 0);
        assert_eq!(report.success_rate(), 1.0);
        assert_eq!(report.longest_cycle_histogram.values().sum::<u64>(), 40);
    }

    #[test]
    fn test_successes_match_cycle_histogram() {
        let config = SimulationConfig::new()
            .with_prisoners(10)
            .with_max_attempts(5)
            .with_trials(200)
            .with_seed(77);
        let report = BatchRunner::new(config).unwrap().run().unwrap();
        let short_layouts: u64 = report
            .longest_cycle_histogram
            .iter()
            .filter(|(length, _)| **length <= 5)
            .map(|(_, count)| *count)
            .sum();
        assert_eq!(report.successes, short_layouts);
        assert_eq!(report.base_seed, 77);
    }

    #[test]
    fn test_seeded_batch_is_reproducible() {
        let config = SimulationConfig::new()
            .with_prisoners(20)
            .with_max_attempts(10)
            .with_trials(100)
            .with_seed(123);
        let first = BatchRunner::new(config.clone()).unwrap().run().unwrap();
        let second = BatchRunner::new(config).unwrap().run().unwrap();
        assert_eq!(first, second);
    }
}
