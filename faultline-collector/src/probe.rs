//! Platform performance probe
//!
//! Navigation timing, resource timing, and heap readings come from
//! whatever platform hosts the application under test. All of it is
//! optional: a probe that cannot report a section returns `None`/empty
//! and the collector degrades to zeros rather than failing the test.

use faultline_core::{MemoryMetrics, PageLoadMetrics};

/// One resource-timing entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub name: String,
    /// Resource type (script, stylesheet, img, fetch, ...)
    pub resource_type: String,
    /// Bytes actually transferred; zero for cache hits
    pub transfer_size_bytes: u64,
    /// Decoded body size; nonzero for cache hits
    pub decoded_size_bytes: u64,
    pub duration_ms: f64,
}

impl ResourceEntry {
    /// Zero transfer size with a nonzero decoded size means the entry
    /// was served from cache
    pub fn is_cache_hit(&self) -> bool {
        self.transfer_size_bytes == 0 && self.decoded_size_bytes > 0
    }
}

/// Source of platform-level readings taken at session stop
pub trait PerformanceProbe: Send + Sync {
    /// Navigation and paint timing, if the platform reports it
    fn page_load(&self) -> Option<PageLoadMetrics> {
        None
    }

    /// Resource-timing entries observed during the session
    fn resources(&self) -> Vec<ResourceEntry> {
        Vec::new()
    }

    /// Heap readings, if the engine exposes a memory API
    fn memory(&self) -> Option<MemoryMetrics> {
        None
    }
}

/// Probe for platforms reporting nothing; every reading degrades
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl PerformanceProbe for NullProbe {}

/// Fixed readings, for tests and replayed sessions
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    pub page_load: Option<PageLoadMetrics>,
    pub resources: Vec<ResourceEntry>,
    pub memory: Option<MemoryMetrics>,
}

impl PerformanceProbe for StaticProbe {
    fn page_load(&self) -> Option<PageLoadMetrics> {
        self.page_load.clone()
    }

    fn resources(&self) -> Vec<ResourceEntry> {
        self.resources.clone()
    }

    fn memory(&self) -> Option<MemoryMetrics> {
        self.memory
    }
}
