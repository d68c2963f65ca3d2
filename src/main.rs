use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use prisoners::{
    BatchRunner, ConcurrencyMode, RunSummary, SimulationConfig, SimulationEngine, SimulationError,
    SimulationObserver, SimulationStatus, StepResult,
};

#[derive(Parser, Debug)]
#[command(name = "prisoners", version, about = "Step-driven 100 prisoners problem simulator")]
struct Cli {
    /// Number of prisoners (and boxes)
    #[arg(short = 'n', long, global = true, default_value_t = 100)]
    prisoners: u32,

    /// Boxes each prisoner may open
    #[arg(short = 'k', long, global = true, default_value_t = 50)]
    attempts: u32,

    /// Seed for the box layout; random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one run step by step, printing every step
    Play {
        /// Pause between steps in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
        /// Wait for Enter before every step ("a" switches to auto-play, "q" quits)
        #[arg(long)]
        manual: bool,
    },
    /// Run one simulation to completion and print the outcome
    Run,
    /// Run many independent simulations and report the success rate
    Batch {
        #[arg(short, long, default_value_t = 1000)]
        trials: u64,
        /// Spread trials over a thread pool
        #[arg(long)]
        parallel: bool,
        /// Thread pool size for --parallel
        #[arg(long)]
        threads: Option<usize>,
    },
}

/// Prints each step as it happens
struct ConsolePrinter;

impl SimulationObserver for ConsolePrinter {
    fn on_step(&mut self, result: &StepResult) {
        match result.status {
            SimulationStatus::FoundNumber => println!("  ✅ {}", result),
            SimulationStatus::NextPrisonerTurn => println!("👤 {}", result),
            SimulationStatus::Searching => println!("  📦 {}", result),
            _ => {}
        }
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        print_summary(summary);
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    match summary.status {
        SimulationStatus::AllSucceeded => {
            println!("🎉 Success! All {} prisoners found their numbers.", summary.succeeded.len())
        }
        _ => match summary.failed_prisoner {
            Some(prisoner) => println!(
                "❌ Failed: prisoner {} did not find their number ({} prisoners succeeded before).",
                prisoner,
                summary.succeeded.len()
            ),
            None => println!("❌ Failed."),
        },
    }
    println!("   run {} finished after {} steps", summary.run_id, summary.steps);
}

/// What the user asked for at a manual-play prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayInput {
    Step,
    Auto,
    Quit,
}

fn parse_play_input(line: &str) -> PlayInput {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "auto" => PlayInput::Auto,
        "q" | "quit" => PlayInput::Quit,
        _ => PlayInput::Step,
    }
}

/// Drive one run step by step, either waiting for Enter or paced by `delay`
fn play(engine: &mut SimulationEngine, mut manual: bool, delay: Duration) -> io::Result<()> {
    let stdin = io::stdin();
    loop {
        if manual {
            print!("⏎ next step (a = auto, q = quit): ");
            io::stdout().flush()?;
            let mut line = String::new();
            // EOF ends the session like "q"
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            match parse_play_input(&line) {
                PlayInput::Step => {}
                PlayInput::Auto => manual = false,
                PlayInput::Quit => return Ok(()),
            }
        }

        if engine.step().status.is_terminal() {
            return Ok(());
        }
        if !manual && !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

fn initialize(engine: &mut SimulationEngine, config: &SimulationConfig) -> Result<(), SimulationError> {
    match config.seed {
        Some(seed) => engine.initialize_seeded(config.prisoners, config.max_attempts_per_prisoner, seed),
        None => engine.initialize(config.prisoners, config.max_attempts_per_prisoner),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let mut config = SimulationConfig::new()
        .with_prisoners(cli.prisoners)
        .with_max_attempts(cli.attempts);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    match cli.command {
        Command::Play { delay_ms, manual } => {
            let config = config.with_step_delay(Duration::from_millis(delay_ms));
            config.validate()?;

            let mut engine = SimulationEngine::new();
            initialize(&mut engine, &config)?;
            engine.add_observer(Box::new(ConsolePrinter));

            println!(
                "🔒 {} prisoners, {} attempts each",
                config.prisoners, config.max_attempts_per_prisoner
            );
            println!("👤 prisoner 1 starts their turn");
            play(&mut engine, manual, config.step_delay)?;
        }
        Command::Run => {
            config.validate()?;

            let mut engine = SimulationEngine::new();
            initialize(&mut engine, &config)?;
            let summary = engine.run_to_completion();
            print_summary(&summary);
        }
        Command::Batch {
            trials,
            parallel,
            threads,
        } => {
            config = config.with_trials(trials);
            if parallel {
                config = config.with_concurrency(ConcurrencyMode::Rayon);
            }
            if let Some(threads) = threads {
                config = config.with_thread_pool_size(threads);
            }

            let report = BatchRunner::new(config)?.run()?;
            println!(
                "📊 {} of {} runs succeeded ({:.2}%), base seed {}",
                report.successes,
                report.trials,
                report.success_rate() * 100.0,
                report.base_seed
            );
            println!("   longest cycle distribution:");
            for (length, count) in &report.longest_cycle_histogram {
                println!("   {:>5}: {}", length, count);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_input() {
        assert_eq!(parse_play_input("\n"), PlayInput::Step);
        assert_eq!(parse_play_input("anything\n"), PlayInput::Step);
        assert_eq!(parse_play_input("a\n"), PlayInput::Auto);
        assert_eq!(parse_play_input(" Auto \n"), PlayInput::Auto);
        assert_eq!(parse_play_input("q\n"), PlayInput::Quit);
        assert_eq!(parse_play_input("QUIT"), PlayInput::Quit);
    }

    #[test]
    fn test_play_runs_to_terminal_status() {
        let mut engine = SimulationEngine::new();
        engine.initialize_seeded(8, 8, 3).unwrap();
        play(&mut engine, false, Duration::ZERO).unwrap();
        assert!(engine.is_finished());
        assert_eq!(engine.status(), SimulationStatus::AllSucceeded);
    }
}
