use anyhow::Context;
use ld2450core::sensor_interface::{decode_telemetry, SensorSnapshot};
use ld2450core::telemetry::{LogManager, MetricsRecorder};
use ld2450core::zones::{Target, ZoneConfigCell, ZoneSet, ZoneStats};
use std::sync::Arc;

/// Everything derived from one telemetry frame.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub snapshot: SensorSnapshot,
    pub targets: Vec<Target>,
    pub visible: Vec<Target>,
    pub occupied_zones: Vec<Vec<usize>>,
    pub zones: ZoneSet,
    pub stats: ZoneStats,
}

/// Decodes frames and classifies their targets against the active zones.
#[derive(Clone)]
pub struct FrameRunner {
    cell: ZoneConfigCell,
    metrics: Arc<MetricsRecorder>,
}

impl FrameRunner {
    pub fn new(cell: ZoneConfigCell) -> Self {
        Self {
            cell,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn cell(&self) -> &ZoneConfigCell {
        &self.cell
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Merges `payload` into `previous` and classifies the resulting targets.
    pub fn execute(&self, previous: &SensorSnapshot, payload: &[u8]) -> anyhow::Result<FrameResult> {
        let record = match decode_telemetry(payload) {
            Ok(record) => record,
            Err(err) => {
                self.metrics.record_decode_error();
                return Err(err).context("decoding telemetry frame");
            }
        };

        let result = self.classify(previous.merge(&record));
        self.metrics
            .record_frame(result.targets.len(), result.visible.len());
        LogManager::new("frame").trace_frame(&format!(
            "targets {} visible {} mode {}",
            result.targets.len(),
            result.visible.len(),
            result.stats.mode
        ));
        Ok(result)
    }

    /// Re-runs classification for an unchanged snapshot, e.g. after a zone edit.
    pub fn classify(&self, snapshot: SensorSnapshot) -> FrameResult {
        let engine = self.cell.engine();
        let targets = snapshot.targets();
        let visible = engine.filter_targets(&targets);
        let occupied_zones = targets
            .iter()
            .map(|target| engine.occupied_zones(target))
            .collect();

        FrameResult {
            snapshot,
            targets,
            visible,
            occupied_zones,
            zones: *engine.config(),
            stats: engine.zone_stats(),
        }
    }
}
