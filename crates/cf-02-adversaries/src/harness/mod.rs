//! # Scenario Harness
//!
//! Fresh fixtures, the scenario catalogue and their reports.

pub mod fixture;
pub mod report;
pub mod scenarios;

pub use fixture::Fixture;
pub use report::{Check, ScenarioReport};
pub use scenarios::{run_all, run_variant, Scenario};
