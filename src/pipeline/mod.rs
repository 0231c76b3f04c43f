//! Normalize → classify → aggregate over one load of raw map records.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::{MapObject, ObjectKind};
use crate::metrics::{AggregateMetrics, NormalizeMetrics};
use crate::types::RawCollections;

pub mod processing;

use processing::aggregate::{self, Aggregate, FilterSpec};
use processing::normalize::{DefaultNormalizer, DroppedRecord, NormalizeReport, Normalizer, RecordWarning};
use processing::priority;

/// Result of a complete pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub aggregate: Aggregate,
    pub total_records: usize,
    pub dropped: Vec<DroppedRecord>,
    pub warnings: Vec<RecordWarning>,
}

impl PipelineResult {
    pub fn coerced_conditions(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| {
                matches!(
                    w.warning,
                    processing::normalize::NormalizationWarning::InvalidCondition { .. }
                )
            })
            .count()
    }
}

/// Runs the processing stages with an injected current year.
pub struct MapPipeline<N: Normalizer = DefaultNormalizer> {
    normalizer: N,
}

impl MapPipeline<DefaultNormalizer> {
    pub fn new(current_year: i32) -> Self {
        Self {
            normalizer: DefaultNormalizer::new(current_year),
        }
    }
}

impl<N: Normalizer> MapPipeline<N> {
    pub fn with_normalizer(normalizer: N) -> Self {
        Self { normalizer }
    }

    /// Normalizes every collection (water bodies, facilities, critical zones, in that order)
    /// and attaches priorities.
    pub fn prepare(&self, raw: &RawCollections) -> (Vec<MapObject>, NormalizeReport) {
        let mut report = NormalizeReport::default();

        for kind in ObjectKind::ALL {
            let records = raw.collection(kind);
            let batch = self.normalizer.normalize_batch(records, kind);

            NormalizeMetrics::record_batch(kind, records.len(), batch.dropped.len(), batch.coerced_conditions());
            if !batch.dropped.is_empty() {
                warn!(%kind, dropped = batch.dropped.len(), "records dropped during normalization");
            }

            report.merge(batch);
        }

        let objects = priority::classify_all(&report.objects);
        (objects, report)
    }

    #[instrument(skip_all, fields(records = raw.total_records()))]
    pub fn run(&self, raw: &RawCollections, filter: &FilterSpec) -> PipelineResult {
        let (objects, report) = self.prepare(raw);
        let aggregate = aggregate::aggregate(&objects, filter);

        AggregateMetrics::record_visible(aggregate.visible.len());
        info!(
            normalized = objects.len(),
            dropped = report.dropped.len(),
            visible = aggregate.counts.total,
            high_priority = aggregate.counts.high_priority_count,
            "pipeline finished"
        );

        PipelineResult {
            aggregate,
            total_records: raw.total_records(),
            dropped: report.dropped,
            warnings: report.warnings,
        }
    }
}
