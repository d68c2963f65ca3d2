pub mod scenario_builder;

pub use scenario_builder::ScenarioBuilder;
