//! Metrics for the resource strategy monitor
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the host process.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Metric names as constants
pub mod names {
    pub const MEMORY_AVAILABLE: &str = "assetlift_memory_available_bytes";
    pub const UPLOAD_BUFFERS: &str = "assetlift_upload_buffer_count";
    pub const MEMORY_MALFUNCTION: &str = "assetlift_memory_malfunction_total";
}

/// Initialize metric descriptions
pub fn init_metrics() {
    describe_gauge!(
        names::MEMORY_AVAILABLE,
        "Available memory reported by the last probe query"
    );
    describe_gauge!(
        names::UPLOAD_BUFFERS,
        "Upload buffer count chosen by the last strategy decision"
    );
    describe_counter!(
        names::MEMORY_MALFUNCTION,
        "Probe readings of zero or negative available memory"
    );
}

pub(crate) fn record_memory_available(bytes: u64) {
    gauge!(names::MEMORY_AVAILABLE).set(bytes as f64);
}

pub(crate) fn record_buffer_count(count: usize) {
    gauge!(names::UPLOAD_BUFFERS).set(count as f64);
}

pub(crate) fn record_malfunction() {
    counter!(names::MEMORY_MALFUNCTION).increment(1);
}
