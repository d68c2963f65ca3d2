use crate::core::errors::SimulationError;
use crate::core::permutation::shuffled_boxes;
use crate::core::state::TurnState;
use crate::core::types::{NumberedBox, RunId, RunSummary, SimulationStatus, StepResult};
use log::{debug, error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Observer trait for simulation events
pub trait SimulationObserver: Send {
    /// Called after every `step()` with the result handed to the caller
    fn on_step(&mut self, result: &StepResult);

    /// Called once, when the run first reaches a terminal status
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Step-driven state machine for the prisoners problem.
///
/// The engine is a plain value owned by its caller. `initialize` lays out a
/// fresh random permutation, then every `step()` performs exactly one action:
/// opening one box, handing the turn to the next prisoner, or reporting the
/// outcome of the run.
pub struct SimulationEngine {
    run_id: RunId,
    boxes: Vec<NumberedBox>,
    number_of_prisoners: u32,
    max_attempts_per_prisoner: u32,
    turn: TurnState,
    initialized: bool,
    status: SimulationStatus,
    steps: u64,
    failed_prisoner: Option<u32>,
    fault: Option<SimulationError>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine {
    /// Create an engine with no boxes; `step()` reports `NotStarted` until initialized
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            boxes: Vec::new(),
            number_of_prisoners: 0,
            max_attempts_per_prisoner: 0,
            turn: TurnState::new(),
            initialized: false,
            status: SimulationStatus::NotStarted,
            steps: 0,
            failed_prisoner: None,
            fault: None,
            observers: Vec::new(),
        }
    }

    /// Start a new run using the thread-local random generator
    pub fn initialize(
        &mut self,
        number_of_prisoners: u32,
        max_attempts_per_prisoner: u32,
    ) -> Result<(), SimulationError> {
        self.initialize_with_rng(number_of_prisoners, max_attempts_per_prisoner, &mut rand::thread_rng())
    }

    /// Start a new, reproducible run from a seed
    pub fn initialize_seeded(
        &mut self,
        number_of_prisoners: u32,
        max_attempts_per_prisoner: u32,
        seed: u64,
    ) -> Result<(), SimulationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.initialize_with_rng(number_of_prisoners, max_attempts_per_prisoner, &mut rng)
    }

    /// Start a new run, drawing the box layout from `rng`.
    ///
    /// Any previous run is discarded. Observers stay registered.
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        &mut self,
        number_of_prisoners: u32,
        max_attempts_per_prisoner: u32,
        rng: &mut R,
    ) -> Result<(), SimulationError> {
        validate_parameters(number_of_prisoners, max_attempts_per_prisoner)?;
        let boxes = shuffled_boxes(number_of_prisoners, rng);
        self.load(boxes, number_of_prisoners, max_attempts_per_prisoner);
        debug!(
            "[{}] initialized {} prisoners, {} attempts each",
            self.run_id, number_of_prisoners, max_attempts_per_prisoner
        );
        Ok(())
    }

    /// Install a box layout and reset all run state. No permutation check.
    pub(crate) fn load(
        &mut self,
        mut boxes: Vec<NumberedBox>,
        number_of_prisoners: u32,
        max_attempts_per_prisoner: u32,
    ) {
        boxes.sort_by_key(|b| b.box_number);
        self.run_id = RunId::new();
        self.boxes = boxes;
        self.number_of_prisoners = number_of_prisoners;
        self.max_attempts_per_prisoner = max_attempts_per_prisoner;
        self.turn = TurnState::new();
        self.initialized = true;
        self.status = SimulationStatus::NotStarted;
        self.steps = 0;
        self.failed_prisoner = None;
        self.fault = None;
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Advance the simulation by one action
    pub fn step(&mut self) -> StepResult {
        let result = self.evaluate_step();

        if self.initialized && self.turn.outcome.is_none() {
            self.steps += 1;
        }
        self.status = result.status;
        debug!("[{}] step {}: {}", self.run_id, self.steps, result);

        for observer in &mut self.observers {
            observer.on_step(&result);
        }

        if result.status.is_terminal() && self.turn.outcome.is_none() {
            self.finish(&result);
        }

        result
    }

    /// Step until the run reaches a terminal status
    pub fn run_to_completion(&mut self) -> RunSummary {
        if self.initialized {
            while !self.step().status.is_terminal() {}
        }
        self.summary()
    }

    fn evaluate_step(&mut self) -> StepResult {
        if !self.initialized {
            return StepResult::bare(SimulationStatus::NotStarted);
        }
        if let Some(outcome) = self.turn.outcome {
            return StepResult::bare(outcome);
        }
        if let Some(outcome) = self.global_outcome() {
            return StepResult::bare(outcome);
        }

        if self.turn.exhausted(self.max_attempts_per_prisoner) {
            return StepResult {
                status: SimulationStatus::Failed,
                prisoner_number: self.turn.current_prisoner,
                box_number_opened: self.turn.last_opened_box,
                value_in_box: (self.turn.last_opened_box > 0).then_some(self.turn.last_opened_value),
                attempts_made: self.turn.attempts_made,
                found_number_in_box: false,
            };
        }

        if self.turn.current_found {
            self.turn.advance_prisoner();
            if let Some(outcome) = self.global_outcome() {
                return StepResult::bare(outcome);
            }
            return StepResult {
                status: SimulationStatus::NextPrisonerTurn,
                prisoner_number: self.turn.current_prisoner,
                ..StepResult::default()
            };
        }

        self.attempt()
    }

    /// Open one box for the current prisoner, following the chain
    fn attempt(&mut self) -> StepResult {
        self.turn.attempts_made += 1;
        let prisoner = self.turn.current_prisoner;

        let box_number = if self.turn.attempts_made == 1 {
            prisoner
        } else {
            let value = self.turn.last_opened_value;
            // Chain values name boxes, so they are bounded by the box count
            let bound = self.boxes.len() as u32;
            if value == 0 || value > bound {
                return self.internal_fault(SimulationError::ChainOutOfRange {
                    value,
                    boxes: bound,
                });
            }
            value
        };

        let Some(opened) = self.find_box(box_number) else {
            return self.internal_fault(SimulationError::BoxNotFound(box_number));
        };

        self.turn.last_opened_value = opened.prisoner_number_inside;
        self.turn.last_opened_box = opened.box_number;

        if opened.prisoner_number_inside == prisoner {
            self.turn.record_success();
            StepResult::opened(SimulationStatus::FoundNumber, prisoner, &opened, self.turn.attempts_made)
        } else {
            StepResult::opened(SimulationStatus::Searching, prisoner, &opened, self.turn.attempts_made)
        }
    }

    fn global_outcome(&self) -> Option<SimulationStatus> {
        if self.turn.all_succeeded(self.number_of_prisoners) {
            Some(SimulationStatus::AllSucceeded)
        } else if self.turn.current_prisoner > self.number_of_prisoners {
            Some(SimulationStatus::Failed)
        } else {
            None
        }
    }

    fn find_box(&self, box_number: u32) -> Option<NumberedBox> {
        let index = (box_number as usize).checked_sub(1)?;
        self.boxes
            .get(index)
            .filter(|b| b.box_number == box_number)
            .or_else(|| self.boxes.iter().find(|b| b.box_number == box_number))
            .copied()
    }

    fn internal_fault(&mut self, fault: SimulationError) -> StepResult {
        error!(
            "[{}] prisoner {}: {}",
            self.run_id, self.turn.current_prisoner, fault
        );
        self.fault = Some(fault);
        StepResult {
            status: SimulationStatus::Failed,
            prisoner_number: self.turn.current_prisoner,
            attempts_made: self.turn.attempts_made,
            ..StepResult::default()
        }
    }

    fn finish(&mut self, result: &StepResult) {
        self.turn.outcome = Some(result.status);
        if result.status == SimulationStatus::Failed && result.prisoner_number > 0 {
            self.failed_prisoner = Some(result.prisoner_number);
        }

        let summary = self.summary();
        match summary.failed_prisoner {
            Some(prisoner) => debug!(
                "[{}] run failed: prisoner {} did not find their number ({} of {} succeeded)",
                self.run_id,
                prisoner,
                summary.succeeded.len(),
                self.number_of_prisoners
            ),
            None => debug!("[{}] run finished after {} steps: {}", self.run_id, self.steps, summary.status),
        }

        for observer in &mut self.observers {
            observer.on_finish(&summary);
        }
    }

    /// Summary of the run so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            status: self.turn.outcome.unwrap_or(self.status),
            steps: self.steps,
            succeeded: self.turn.succeeded.iter().copied().collect(),
            failed_prisoner: self.failed_prisoner,
        }
    }

    /// Snapshot of every box in box-number order
    pub fn boxes(&self) -> Vec<NumberedBox> {
        self.boxes.clone()
    }

    /// Status returned by the most recent step
    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.turn.outcome.is_some()
    }

    pub fn succeeded_prisoners(&self) -> Vec<u32> {
        self.turn.succeeded.iter().copied().collect()
    }

    pub fn current_prisoner(&self) -> u32 {
        self.turn.current_prisoner
    }

    pub fn attempts_made(&self) -> u32 {
        self.turn.attempts_made
    }

    pub fn number_of_prisoners(&self) -> u32 {
        self.number_of_prisoners
    }

    pub fn max_attempts_per_prisoner(&self) -> u32 {
        self.max_attempts_per_prisoner
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Last internal-consistency error hit while stepping, if any
    pub fn fault(&self) -> Option<&SimulationError> {
        self.fault.as_ref()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_parameters(
    number_of_prisoners: u32,
    max_attempts_per_prisoner: u32,
) -> Result<(), SimulationError> {
    if number_of_prisoners == 0 {
        return Err(SimulationError::InvalidArgument(
            "number of prisoners must be greater than zero".to_string(),
        ));
    }
    if max_attempts_per_prisoner == 0 {
        return Err(SimulationError::InvalidArgument(
            "attempts per prisoner must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
