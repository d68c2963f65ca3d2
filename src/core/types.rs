use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A numbered box holding exactly one prisoner's number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberedBox {
    pub(crate) box_number: u32,
    pub(crate) prisoner_number_inside: u32,
}

impl NumberedBox {
    /// Create a new box
    pub fn new(box_number: u32, prisoner_number_inside: u32) -> Self {
        Self {
            box_number,
            prisoner_number_inside,
        }
    }

    /// Get the box number
    pub fn box_number(&self) -> u32 {
        self.box_number
    }

    /// Get the prisoner number stored inside
    pub fn prisoner_number_inside(&self) -> u32 {
        self.prisoner_number_inside
    }
}

impl std::fmt::Display for NumberedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "box {} -> {}", self.box_number, self.prisoner_number_inside)
    }
}

/// Status reported by every simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationStatus {
    /// The engine has not been initialized or has not been stepped yet
    NotStarted,
    /// The current prisoner opened a box holding someone else's number
    Searching,
    /// The current prisoner opened the box holding their own number
    FoundNumber,
    /// Control passed to the next prisoner
    NextPrisonerTurn,
    /// A prisoner ran out of attempts; the run is lost
    Failed,
    /// Every prisoner found their number
    AllSucceeded,
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationStatus::Failed | SimulationStatus::AllSucceeded)
    }
}

impl Default for SimulationStatus {
    fn default() -> Self {
        SimulationStatus::NotStarted
    }
}

impl std::fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SimulationStatus::NotStarted => "not started",
            SimulationStatus::Searching => "searching",
            SimulationStatus::FoundNumber => "found number",
            SimulationStatus::NextPrisonerTurn => "next prisoner",
            SimulationStatus::Failed => "failed",
            SimulationStatus::AllSucceeded => "all succeeded",
        };
        f.write_str(name)
    }
}

/// Outcome of a single `step()` call.
///
/// Fields that carry no meaning for the reported status are left at zero,
/// `None` or `false`. Terminal results produced by the global checks are
/// always such bare records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepResult {
    pub status: SimulationStatus,
    pub prisoner_number: u32,
    pub box_number_opened: u32,
    pub value_in_box: Option<u32>,
    pub attempts_made: u32,
    pub found_number_in_box: bool,
}

impl StepResult {
    /// A result carrying only a status
    pub fn bare(status: SimulationStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// A result describing one opened box
    pub fn opened(
        status: SimulationStatus,
        prisoner_number: u32,
        opened: &NumberedBox,
        attempts_made: u32,
    ) -> Self {
        Self {
            status,
            prisoner_number,
            box_number_opened: opened.box_number,
            value_in_box: Some(opened.prisoner_number_inside),
            attempts_made,
            found_number_in_box: opened.prisoner_number_inside == prisoner_number,
        }
    }
}

impl std::fmt::Display for StepResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            SimulationStatus::Searching | SimulationStatus::FoundNumber => write!(
                f,
                "prisoner {} attempt {}: opened box {}, found {}",
                self.prisoner_number,
                self.attempts_made,
                self.box_number_opened,
                self.value_in_box.unwrap_or_default()
            ),
            SimulationStatus::NextPrisonerTurn => {
                write!(f, "prisoner {} starts their turn", self.prisoner_number)
            }
            SimulationStatus::Failed if self.prisoner_number > 0 => write!(
                f,
                "prisoner {} failed after {} attempts",
                self.prisoner_number, self.attempts_made
            ),
            status => write!(f, "{}", status),
        }
    }
}

/// Identifier of one initialized run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of a run driven until a terminal status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub status: SimulationStatus,
    /// Number of `step()` calls up to and including the one that returned the
    /// terminal status; repeated calls after the run ended are not counted
    pub steps: u64,
    pub succeeded: Vec<u32>,
    pub failed_prisoner: Option<u32>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.status == SimulationStatus::AllSucceeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(SimulationStatus::Failed.is_terminal());
        assert!(SimulationStatus::AllSucceeded.is_terminal());
        assert!(!SimulationStatus::Searching.is_terminal());
        assert!(!SimulationStatus::NotStarted.is_terminal());
    }

    #[test]
    fn test_opened_result_marks_own_number() {
        let found = StepResult::opened(SimulationStatus::FoundNumber, 3, &NumberedBox::new(7, 3), 2);
        assert!(found.found_number_in_box);
        assert_eq!(found.box_number_opened, 7);
        assert_eq!(found.value_in_box, Some(3));

        let searching = StepResult::opened(SimulationStatus::Searching, 3, &NumberedBox::new(3, 7), 1);
        assert!(!searching.found_number_in_box);
    }

    #[test]
    fn test_bare_result() {
        let result = StepResult::bare(SimulationStatus::AllSucceeded);
        assert_eq!(result.prisoner_number, 0);
        assert_eq!(result.value_in_box, None);
        assert!(!result.found_number_in_box);
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
