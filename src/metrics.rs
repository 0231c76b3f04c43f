//! Pipeline counters.
//!
//! Recorded through the `metrics` facade; they are no-ops until the host
//! process installs a recorder.

use crate::domain::ObjectKind;

pub const RECORDS_TOTAL: &str = "gts_normalize_records_total";
pub const DROPPED_TOTAL: &str = "gts_normalize_dropped_total";
pub const CONDITIONS_COERCED_TOTAL: &str = "gts_normalize_conditions_coerced_total";
pub const VISIBLE_TOTAL: &str = "gts_aggregate_visible_total";

/// Metrics for the normalization stage
pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_batch(kind: ObjectKind, records: usize, dropped: usize, coerced: usize) {
        ::metrics::counter!(RECORDS_TOTAL, "kind" => kind.as_str()).increment(records as u64);
        ::metrics::counter!(DROPPED_TOTAL, "kind" => kind.as_str()).increment(dropped as u64);
        ::metrics::counter!(CONDITIONS_COERCED_TOTAL, "kind" => kind.as_str())
            .increment(coerced as u64);
    }
}

/// Metrics for the filter/aggregate stage
pub struct AggregateMetrics;

impl AggregateMetrics {
    pub fn record_visible(visible: usize) {
        ::metrics::counter!(VISIBLE_TOTAL).increment(visible as u64);
    }
}
