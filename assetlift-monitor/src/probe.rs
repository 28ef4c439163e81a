//! Platform memory queries
//!
//! The monitor never talks to the OS directly; it asks a `MemoryProbe`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Source of live available-memory readings
///
/// Readings are signed: a broken host may report zero or a negative value,
/// and the monitor needs to see that to treat it as a malfunction.
#[cfg_attr(test, mockall::automock)]
pub trait MemoryProbe: Send {
    /// Currently available memory in bytes
    fn available_memory(&mut self) -> i64;
}

/// Probe backed by `sysinfo`
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new().with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self { system }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn available_memory(&mut self) -> i64 {
        self.system
            .refresh_memory_specifics(MemoryRefreshKind::new().with_ram());
        i64::try_from(self.system.available_memory()).unwrap_or(i64::MAX)
    }
}

/// Probe returning a settable reading
///
/// Clones share the reading, so a test can keep one and hand the other to a
/// monitor.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    reading: Arc<AtomicI64>,
}

impl FixedProbe {
    pub fn new(bytes: i64) -> Self {
        Self {
            reading: Arc::new(AtomicI64::new(bytes)),
        }
    }

    /// Change the reading seen by every clone
    pub fn set(&self, bytes: i64) {
        self.reading.store(bytes, Ordering::SeqCst);
    }
}

impl MemoryProbe for FixedProbe {
    fn available_memory(&mut self) -> i64 {
        self.reading.load(Ordering::SeqCst)
    }
}
