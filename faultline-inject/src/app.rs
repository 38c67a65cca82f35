//! Application fault simulation
//!
//! In-process faults unrelated to networking: failing storage access,
//! disabled capabilities, and directly raised runtime errors. Unlike
//! network rules these do not expire; the owning test restores state
//! with [`AppFaultSimulator::reset`] between cases.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Storage access failures raised by [`FaultyStore`]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage read unavailable")]
    ReadUnavailable,

    #[error("storage write unavailable")]
    WriteUnavailable,
}

/// Key-value storage boundary used by the application under test
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Plain in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map.lock().remove(key);
        Ok(())
    }
}

/// Toggles shared between a [`FaultyStore`] and its simulator
#[derive(Debug, Default)]
pub struct StoreFaults {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Store decorator whose reads/writes can be made to fail on demand
pub struct FaultyStore<S> {
    inner: S,
    faults: Arc<StoreFaults>,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S, faults: Arc<StoreFaults>) -> Self {
        Self { inner, faults }
    }
}

impl<S: KeyValueStore> KeyValueStore for FaultyStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.faults.fail_reads.load(Ordering::Relaxed) {
            return Err(StorageError::ReadUnavailable);
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.faults.fail_writes.load(Ordering::Relaxed) {
            return Err(StorageError::WriteUnavailable);
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.faults.fail_writes.load(Ordering::Relaxed) {
            return Err(StorageError::WriteUnavailable);
        }
        self.inner.remove(key)
    }
}

/// Named capabilities (notifications, clipboard, ...) that faults can
/// switch off
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    disabled: Mutex<HashSet<String>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capability is currently available
    pub fn available(&self, name: &str) -> bool {
        !self.disabled.lock().contains(name)
    }

    pub fn disable(&self, name: &str) {
        self.disabled.lock().insert(name.to_string());
    }

    pub fn enable(&self, name: &str) {
        self.disabled.lock().remove(name);
    }

    fn reset(&self) {
        self.disabled.lock().clear();
    }
}

/// Errors a test raises to stand in for in-process application bugs
#[derive(Debug, thiserror::Error)]
pub enum AppFaultError {
    #[error("reference error: {0}")]
    Reference(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Front door for in-process fault triggers.
///
/// Every trigger is synchronous and immediate. Nothing here expires on
/// its own; call [`reset`](Self::reset) in teardown.
#[derive(Debug, Default)]
pub struct AppFaultSimulator {
    store_faults: Arc<StoreFaults>,
    capabilities: Arc<CapabilityRegistry>,
}

impl AppFaultSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a store so this simulator controls its failures
    pub fn wrap_store<S: KeyValueStore>(&self, store: S) -> FaultyStore<S> {
        FaultyStore::new(store, self.store_faults.clone())
    }

    /// Capability registry consulted by the application under test
    pub fn capabilities(&self) -> Arc<CapabilityRegistry> {
        self.capabilities.clone()
    }

    pub fn fail_storage_reads(&self, fail: bool) {
        info!("Storage reads {}", if fail { "failing" } else { "restored" });
        self.store_faults.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_storage_writes(&self, fail: bool) {
        info!("Storage writes {}", if fail { "failing" } else { "restored" });
        self.store_faults.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn disable_capability(&self, name: &str) {
        info!("Capability '{}' disabled", name);
        self.capabilities.disable(name);
    }

    /// Construct a reference error for the caller to raise
    pub fn reference_error(&self, detail: impl Into<String>) -> AppFaultError {
        AppFaultError::Reference(detail.into())
    }

    /// Construct a type error for the caller to raise
    pub fn type_error(&self, detail: impl Into<String>) -> AppFaultError {
        AppFaultError::Type(detail.into())
    }

    /// Construct a runtime error for the caller to raise
    pub fn runtime_error(&self, detail: impl Into<String>) -> AppFaultError {
        AppFaultError::Runtime(detail.into())
    }

    /// Restore storage and capabilities to their normal state
    pub fn reset(&self) {
        self.store_faults.fail_reads.store(false, Ordering::Relaxed);
        self.store_faults.fail_writes.store(false, Ordering::Relaxed);
        self.capabilities.reset();
    }
}
