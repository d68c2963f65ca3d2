//! Deterministic engine construction for tests.
//!
//! Bypasses the random shuffle and accepts any box layout, including ones
//! that are not permutations. Only compiled for tests or with the
//! `test-support` feature.

use crate::core::errors::SimulationError;
use crate::core::execution::simulation_engine::{validate_parameters, SimulationEngine};
use crate::core::types::NumberedBox;

/// Builds a `SimulationEngine` from a caller-supplied box layout
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    boxes: Vec<NumberedBox>,
    prisoners: Option<u32>,
    max_attempts: u32,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one box
    pub fn with_box(mut self, box_number: u32, prisoner_number_inside: u32) -> Self {
        self.boxes.push(NumberedBox::new(box_number, prisoner_number_inside));
        self
    }

    /// Lay out boxes 1..=contents.len() holding `contents` in order
    pub fn with_contents(mut self, contents: &[u32]) -> Self {
        self.boxes = contents
            .iter()
            .zip(1..)
            .map(|(&inside, box_number)| NumberedBox::new(box_number, inside))
            .collect();
        self
    }

    /// Number of prisoners; defaults to the number of boxes
    pub fn prisoners(mut self, prisoners: u32) -> Self {
        self.prisoners = Some(prisoners);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn build(self) -> Result<SimulationEngine, SimulationError> {
        let prisoners = self.prisoners.unwrap_or(self.boxes.len() as u32);
        validate_parameters(prisoners, self.max_attempts)?;

        let mut engine = SimulationEngine::new();
        engine.load(self.boxes, prisoners, self.max_attempts);
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SimulationStatus;

    #[test]
    fn test_build_keeps_layout() {
        let engine = ScenarioBuilder::new()
            .with_box(2, 1)
            .with_box(1, 2)
            .max_attempts(2)
            .build()
            .unwrap();

        assert_eq!(engine.number_of_prisoners(), 2);
        assert_eq!(
            engine.boxes(),
            vec![NumberedBox::new(1, 2), NumberedBox::new(2, 1)]
        );
        assert_eq!(engine.status(), SimulationStatus::NotStarted);
    }

    #[test]
    fn test_build_rejects_zero_attempts() {
        let result = ScenarioBuilder::new().with_contents(&[1]).build();
        assert!(matches!(result, Err(SimulationError::InvalidArgument(_))));
    }

    #[test]
    fn test_build_accepts_non_permutation() {
        let engine = ScenarioBuilder::new()
            .with_contents(&[1, 1])
            .max_attempts(1)
            .build()
            .unwrap();
        assert_eq!(engine.boxes().len(), 2);
    }
}
