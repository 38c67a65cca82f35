//! Chaos orchestration
//!
//! Runs a randomized trial loop over a set of endpoints: each second,
//! with a configured probability, one endpoint and one fault kind are
//! picked uniformly at random and activated on the shared injection
//! context. A run is bounded by a total duration and can be stopped at
//! any time; stopping cancels the loop and clears every active fault.

mod options;
mod orchestrator;

pub use options::{ChaosError, ChaosOptions};
pub use orchestrator::ChaosOrchestrator;
