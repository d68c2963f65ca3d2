use std::collections::BTreeSet;

use super::types::SimulationStatus;

/// Per-run turn tracking.
///
/// Prisoners take turns in number order. A turn ends when the prisoner finds
/// their own number or runs out of attempts.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub(crate) current_prisoner: u32,
    pub(crate) attempts_made: u32,
    /// Content of the box opened last this turn, 0 before the first attempt
    pub(crate) last_opened_value: u32,
    /// Number of the box opened last this turn, 0 before the first attempt
    pub(crate) last_opened_box: u32,
    pub(crate) current_found: bool,
    pub(crate) succeeded: BTreeSet<u32>,
    pub(crate) outcome: Option<SimulationStatus>,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            current_prisoner: 1,
            attempts_made: 0,
            last_opened_value: 0,
            last_opened_box: 0,
            current_found: false,
            succeeded: BTreeSet::new(),
            outcome: None,
        }
    }

    /// Hand the turn to the next prisoner in number order
    pub fn advance_prisoner(&mut self) {
        self.current_prisoner += 1;
        self.attempts_made = 0;
        self.current_found = false;
        self.last_opened_value = 0;
        self.last_opened_box = 0;
    }

    pub fn record_success(&mut self) {
        self.current_found = true;
        self.succeeded.insert(self.current_prisoner);
    }

    pub fn all_succeeded(&self, prisoners: u32) -> bool {
        self.succeeded.len() as u64 == u64::from(prisoners)
    }

    pub fn exhausted(&self, max_attempts: u32) -> bool {
        !self.current_found && self.attempts_made >= max_attempts
    }

    pub fn current_prisoner(&self) -> u32 {
        self.current_prisoner
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn succeeded(&self) -> &BTreeSet<u32> {
        &self.succeeded
    }

    pub fn outcome(&self) -> Option<SimulationStatus> {
        self.outcome
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}
