//! Performance measurement and threshold validation
//!
//! A [`PerformanceCollector`] owns one measurement session at a time:
//! API calls are observed through the [`ObservedClient`] decorator,
//! interactions are wrapped with
//! [`measure_interaction`](PerformanceCollector::measure_interaction),
//! and platform-level readings come from a [`PerformanceProbe`] when
//! the session stops. Validation against threshold budgets is a pure
//! function over the finished snapshot.

pub mod collector;
pub mod observe;
pub mod probe;
pub mod validator;

pub use collector::{ApiCall, PerformanceCollector};
pub use observe::ObservedClient;
pub use probe::{NullProbe, PerformanceProbe, ResourceEntry, StaticProbe};
pub use validator::validate;
