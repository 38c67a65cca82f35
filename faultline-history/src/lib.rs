//! Run history persistence and trend analysis
//!
//! Each test accumulates an append-only JSON document of validated
//! runs, pruned to a retention policy (age window intersected with an
//! entry cap). Trends are recomputed on demand from the stored
//! entries and never persisted.

pub mod error;
pub mod store;
pub mod trend;

pub use error::{HistoryError, HistoryResult};
pub use store::{HistoryStore, RetentionPolicy};
pub use trend::{trend_over, Regression};
