//! Resource strategy monitor
//!
//! Every query goes through one mutex around the probe, so concurrent
//! upload workers never interleave inside a single reading. Only the memory
//! signals vary; throughput, pause, thermal and battery signals are fixed
//! product decisions.

use crate::config::MonitorConfig;
use crate::metrics;
use crate::probe::{MemoryProbe, SysinfoProbe};
use assetlift_core::strategy::{MemoryStrategy, MemoryThresholds};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Reading reported in place of a non-positive probe value
pub const MALFUNCTION_SENTINEL_BYTES: u64 = 1;

/// Thermal headroom tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermalBudget {
    Unrestricted,
    Elevated,
    Constrained,
    Critical,
}

impl fmt::Display for ThermalBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThermalBudget::Unrestricted => "unrestricted",
            ThermalBudget::Elevated => "elevated",
            ThermalBudget::Constrained => "constrained",
            ThermalBudget::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// All monitor signals captured by one call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub memory_available: u64,
    pub malfunction: bool,
    pub strategy: MemoryStrategy,
    pub buffers: usize,
    pub upload_budget: f64,
    pub should_pause: bool,
    pub thermal_budget: ThermalBudget,
    pub battery_level: Option<f32>,
}

/// Memory reading after malfunction clamping
#[derive(Debug, Clone, Copy)]
struct Reading {
    bytes: u64,
    malfunction: bool,
}

/// Buffer-sizing and throttle arbiter for the upload scheduler
pub struct ResourceStrategyMonitor<P: MemoryProbe = SysinfoProbe> {
    probe: Mutex<P>,
    thresholds: MemoryThresholds,
    record_metrics: bool,
}

impl ResourceStrategyMonitor<SysinfoProbe> {
    /// Monitor backed by the host's memory statistics
    pub fn with_sysinfo(config: MonitorConfig) -> Self {
        Self::new(SysinfoProbe::new(), config)
    }
}

impl<P: MemoryProbe> ResourceStrategyMonitor<P> {
    pub fn new(probe: P, config: MonitorConfig) -> Self {
        Self {
            probe: Mutex::new(probe),
            thresholds: config.thresholds,
            record_metrics: config.record_metrics,
        }
    }

    pub fn thresholds(&self) -> &MemoryThresholds {
        &self.thresholds
    }

    async fn read(&self) -> Reading {
        let raw = {
            let mut probe = self.probe.lock().await;
            probe.available_memory()
        };

        let reading = match u64::try_from(raw) {
            Ok(bytes) if bytes > 0 => Reading {
                bytes,
                malfunction: false,
            },
            _ => {
                warn!(reading = raw, "Memory probe reported non-positive available memory");
                if self.record_metrics {
                    metrics::record_malfunction();
                }
                Reading {
                    bytes: MALFUNCTION_SENTINEL_BYTES,
                    malfunction: true,
                }
            }
        };

        if self.record_metrics {
            metrics::record_memory_available(reading.bytes);
        }
        reading
    }

    fn decide(&self, reading: Reading) -> MemoryStrategy {
        let strategy = if reading.malfunction {
            MemoryStrategy::Emergency
        } else {
            MemoryStrategy::for_available_bytes(reading.bytes, &self.thresholds)
        };

        debug!(
            available = reading.bytes,
            tier = strategy.tier(),
            buffers = strategy.buffer_count(),
            "Memory strategy computed"
        );
        if self.record_metrics {
            metrics::record_buffer_count(strategy.buffer_count());
        }
        strategy
    }

    /// Live available memory in bytes; always positive
    pub async fn memory_available(&self) -> u64 {
        self.read().await.bytes
    }

    /// Buffer-pool tier for the live reading
    pub async fn memory_strategy(&self) -> MemoryStrategy {
        let reading = self.read().await;
        self.decide(reading)
    }

    /// Fraction of upload throughput allowed; uploads are never throttled
    pub fn upload_budget(&self) -> f64 {
        1.0
    }

    pub fn should_pause_upload(&self) -> bool {
        false
    }

    pub fn thermal_budget(&self) -> ThermalBudget {
        ThermalBudget::Unrestricted
    }

    /// Battery charge fraction; not tracked
    pub fn battery_level(&self) -> Option<f32> {
        None
    }

    /// Every signal from a single probe reading
    pub async fn snapshot(&self) -> ResourceSnapshot {
        let reading = self.read().await;
        let strategy = self.decide(reading);
        ResourceSnapshot {
            memory_available: reading.bytes,
            malfunction: reading.malfunction,
            strategy,
            buffers: strategy.buffer_count(),
            upload_budget: self.upload_budget(),
            should_pause: self.should_pause_upload(),
            thermal_budget: self.thermal_budget(),
            battery_level: self.battery_level(),
        }
    }
}
