//! Upload buffer sizing tiers
//!
//! Maps an available-memory reading onto one of four tiers, each fixing the
//! size of the upload buffer pool. The count belongs to the tier, so counts
//! strictly decrease from `Full` to `Emergency` and never drop below
//! [`MIN_BUFFERS`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard floor on the buffer pool; uploads always make progress with this many
pub const MIN_BUFFERS: usize = 2;

/// Buffer count per tier
pub const FULL_BUFFERS: usize = 12;
pub const REDUCED_BUFFERS: usize = 8;
pub const MINIMAL_BUFFERS: usize = 4;
pub const EMERGENCY_BUFFERS: usize = MIN_BUFFERS;

/// Lower bounds (inclusive) of available memory for each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryThresholds {
    /// At or above this, use the full pool
    pub full_min_bytes: u64,

    /// At or above this, use the reduced pool
    pub reduced_min_bytes: u64,

    /// At or above this, use the minimal pool; below it, emergency
    pub minimal_min_bytes: u64,
}

impl Default for MemoryThresholds {
    fn default() -> Self {
        Self {
            full_min_bytes: 2 * 1024 * 1024 * 1024, // 2 GB
            reduced_min_bytes: 1024 * 1024 * 1024,  // 1 GB
            minimal_min_bytes: 512 * 1024 * 1024,   // 512 MB
        }
    }
}

impl MemoryThresholds {
    /// Thresholds must strictly descend and leave room for an emergency tier
    pub fn is_valid(&self) -> bool {
        self.full_min_bytes > self.reduced_min_bytes
            && self.reduced_min_bytes > self.minimal_min_bytes
            && self.minimal_min_bytes > 0
    }
}

/// Buffer-pool sizing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryStrategy {
    Full,
    Reduced,
    Minimal,
    Emergency,
}

impl MemoryStrategy {
    /// Every tier, most to least generous
    pub const ALL: [MemoryStrategy; 4] = [
        MemoryStrategy::Full,
        MemoryStrategy::Reduced,
        MemoryStrategy::Minimal,
        MemoryStrategy::Emergency,
    ];

    /// Tier for an available-memory reading
    pub fn for_available_bytes(available: u64, thresholds: &MemoryThresholds) -> Self {
        if available >= thresholds.full_min_bytes {
            MemoryStrategy::Full
        } else if available >= thresholds.reduced_min_bytes {
            MemoryStrategy::Reduced
        } else if available >= thresholds.minimal_min_bytes {
            MemoryStrategy::Minimal
        } else {
            MemoryStrategy::Emergency
        }
    }

    /// Number of upload buffers to allocate
    pub fn buffer_count(&self) -> usize {
        match self {
            MemoryStrategy::Full => FULL_BUFFERS,
            MemoryStrategy::Reduced => REDUCED_BUFFERS,
            MemoryStrategy::Minimal => MINIMAL_BUFFERS,
            MemoryStrategy::Emergency => EMERGENCY_BUFFERS,
        }
    }

    /// Tier name
    pub fn tier(&self) -> &'static str {
        match self {
            MemoryStrategy::Full => "full",
            MemoryStrategy::Reduced => "reduced",
            MemoryStrategy::Minimal => "minimal",
            MemoryStrategy::Emergency => "emergency",
        }
    }
}

impl fmt::Display for MemoryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} buffers)", self.tier(), self.buffer_count())
    }
}
