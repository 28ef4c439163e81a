//! AssetLift Resource Monitor
//!
//! Tells the upload scheduler how many buffers to allocate based on live
//! available memory:
//! - `MemoryProbe` abstracts the platform query
//! - `ResourceStrategyMonitor` serializes probe access and maps readings to tiers
//! - `MonitorConfig` carries tunable thresholds

pub mod config;
pub mod metrics;
pub mod monitor;
pub mod probe;

pub use config::MonitorConfig;
pub use monitor::{ResourceSnapshot, ResourceStrategyMonitor, ThermalBudget};
pub use probe::{FixedProbe, MemoryProbe, SysinfoProbe};

pub use assetlift_core::strategy::{MemoryStrategy, MemoryThresholds, MIN_BUFFERS};
