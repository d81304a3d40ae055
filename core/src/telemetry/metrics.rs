use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Frame and target counters shared between the session and the dashboard.
pub struct MetricsRecorder {
    inner: Mutex<FrameMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub frames: usize,
    pub decode_errors: usize,
    pub targets_seen: usize,
    pub targets_kept: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FrameMetrics::default()),
        }
    }

    pub fn record_frame(&self, seen: usize, kept: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames += 1;
            metrics.targets_seen += seen;
            metrics.targets_kept += kept;
        }
    }

    pub fn record_decode_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.decode_errors += 1;
        }
    }

    pub fn snapshot(&self) -> FrameMetrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            FrameMetrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
