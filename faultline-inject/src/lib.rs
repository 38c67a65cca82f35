//! HTTP fault injection for resilience tests
//!
//! The injection state lives in an explicit [`FaultInjectionContext`]
//! owned by the test harness; there is no ambient global registry.
//! Requests flow through an [`InterceptingClient`] that consults the
//! context before delegating to the real client, so clearing the
//! context deterministically restores normal traffic.

pub mod app;
pub mod client;
pub mod context;
pub mod errors;
pub mod intercept;
pub mod types;

pub use app::{AppFaultError, AppFaultSimulator, CapabilityRegistry, FaultyStore, KeyValueStore, MemoryStore, StorageError};
pub use client::{HttpClient, ReqwestClient};
pub use context::{FaultInjectionContext, InjectedFailure, InjectionDecision};
pub use errors::HttpError;
pub use intercept::InterceptingClient;
pub use types::{HttpMethod, HttpRequest, HttpResponse};
