//! Core types for the Faultline resilience test harness
//!
//! This crate holds the data model shared by the injector, chaos
//! orchestrator, performance collector, and history store: fault kinds
//! and rules, URL patterns, performance snapshots, validation results,
//! and history/trend records. It contains no I/O.

pub mod fault;
pub mod history;
pub mod pattern;
pub mod perf;
pub mod validation;

pub use fault::{FaultBody, FaultKind, FaultRule};
pub use history::{HistoryEntry, RunMetadata, RunSummary, TrendDirection, TrendResult};
pub use pattern::UrlPattern;
pub use perf::{
    ApiMetrics, CallTiming, InteractionMetrics, MemoryMetrics, NetworkMetrics, PageLoadMetrics,
    PerformanceSnapshot, ResourceMetrics, SessionTiming,
};
pub use validation::{Severity, ValidationResult, Violation};
