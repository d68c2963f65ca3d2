use std::collections::BTreeSet;

use prisoners::core::permutation::{is_permutation, longest_cycle};
use prisoners::{
    BatchRunner, ConcurrencyMode, SimulationConfig, SimulationEngine, SimulationError,
    SimulationStatus, StepResult,
};

/// Drive a run by hand and check the invariants that must hold after every step
fn drive_and_check(engine: &mut SimulationEngine) -> Vec<StepResult> {
    let n = engine.number_of_prisoners();
    let k = engine.max_attempts_per_prisoner();
    let mut results = Vec::new();
    let mut succeeded = BTreeSet::new();

    loop {
        let result = engine.step();
        results.push(result);

        assert!(engine.attempts_made() <= k);
        assert!(engine.current_prisoner() <= n + 1);
        let now: BTreeSet<u32> = engine.succeeded_prisoners().into_iter().collect();
        assert!(now.is_superset(&succeeded), "success set shrank");
        succeeded = now;

        match result.status {
            SimulationStatus::Searching | SimulationStatus::FoundNumber => {
                assert!(result.attempts_made >= 1 && result.attempts_made <= k);
                assert_eq!(
                    result.found_number_in_box,
                    result.value_in_box == Some(result.prisoner_number)
                );
                if result.attempts_made == 1 {
                    assert_eq!(result.box_number_opened, result.prisoner_number);
                }
            }
            SimulationStatus::NextPrisonerTurn => assert_eq!(result.attempts_made, 0),
            _ => {}
        }

        if result.status.is_terminal() {
            return results;
        }
    }
}

#[test]
fn test_initialized_boxes_are_permutations() {
    let mut engine = SimulationEngine::new();
    for n in [1, 3, 10, 100, 1000] {
        engine.initialize(n, n / 2 + 1).unwrap();
        let boxes = engine.boxes();
        assert_eq!(boxes.len(), n as usize);
        assert!(is_permutation(&boxes));

        let numbers: BTreeSet<u32> = boxes.iter().map(|b| b.box_number()).collect();
        let inside: BTreeSet<u32> = boxes.iter().map(|b| b.prisoner_number_inside()).collect();
        assert_eq!(numbers, (1..=n).collect());
        assert_eq!(inside, (1..=n).collect());
    }
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let mut engine = SimulationEngine::new();
    assert!(matches!(
        engine.initialize(0, 1),
        Err(SimulationError::InvalidArgument(_))
    ));
    assert!(matches!(
        engine.initialize_seeded(1, 0, 1),
        Err(SimulationError::InvalidArgument(_))
    ));
}

#[test]
fn test_engine_accepts_more_attempts_than_boxes() {
    let mut engine = SimulationEngine::new();
    engine.initialize_seeded(3, 10, 4).unwrap();
    assert!(engine.run_to_completion().is_success());
}

#[test]
fn test_step_invariants_hold_across_seeds() {
    let mut engine = SimulationEngine::new();
    for seed in 0..50 {
        engine.initialize_seeded(40, 20, seed).unwrap();
        let expected_success = longest_cycle(&engine.boxes()) <= 20;
        let results = drive_and_check(&mut engine);

        let last = results.last().unwrap();
        if expected_success {
            assert_eq!(*last, StepResult::bare(SimulationStatus::AllSucceeded));
            assert_eq!(engine.succeeded_prisoners().len(), 40);
        } else {
            assert_eq!(last.status, SimulationStatus::Failed);
            assert_eq!(last.attempts_made, 20);
            assert!(!last.found_number_in_box);
        }
    }
}

#[test]
fn test_terminal_results_repeat() {
    let mut engine = SimulationEngine::new();
    engine.initialize_seeded(10, 5, 11).unwrap();
    let summary = engine.run_to_completion();
    let before = engine.succeeded_prisoners();

    for _ in 0..5 {
        assert_eq!(engine.step(), StepResult::bare(summary.status));
    }
    assert_eq!(engine.succeeded_prisoners(), before);
    assert_eq!(engine.summary().status, summary.status);
}

#[test]
fn test_batch_is_independent_of_concurrency_mode() {
    let config = SimulationConfig::new()
        .with_prisoners(30)
        .with_max_attempts(15)
        .with_trials(300)
        .with_seed(2024);

    let sequential = BatchRunner::new(config.clone()).unwrap().run().unwrap();
    let parallel = BatchRunner::new(
        config
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4),
    )
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_classic_puzzle_success_rate() {
    let config = SimulationConfig::new()
        .with_trials(1000)
        .with_seed(31)
        .with_concurrency(ConcurrencyMode::Rayon);
    let report = BatchRunner::new(config).unwrap().run().unwrap();

    // 1 - (H_100 - H_50) is roughly 0.3118
    let rate = report.success_rate();
    assert!((0.24..0.38).contains(&rate), "success rate {}", rate);
}
