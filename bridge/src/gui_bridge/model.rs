use crate::workflow::runner::FrameResult;
use ld2450core::sensor_interface::SensorSnapshot;
use ld2450core::telemetry::FrameMetrics;
use ld2450core::zones::{zone_stats, Target, ZoneSet, ZoneStats};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

pub type SharedDashboard = Arc<RwLock<DashboardModel>>;

/// Everything the visualizer renders, served from `GET /payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardModel {
    pub connected: bool,
    pub snapshot: SensorSnapshot,
    pub targets: Vec<Target>,
    pub visible_targets: Vec<Target>,
    pub occupied_zones: Vec<Vec<usize>>,
    pub zones: ZoneSet,
    pub stats: ZoneStats,
    pub metrics: FrameMetrics,
    pub status: String,
}

impl DashboardModel {
    pub fn new(zones: ZoneSet) -> Self {
        Self {
            connected: false,
            snapshot: SensorSnapshot::default(),
            targets: Vec::new(),
            visible_targets: Vec::new(),
            occupied_zones: Vec::new(),
            stats: zone_stats(&zones),
            zones,
            metrics: FrameMetrics::default(),
            status: "Disconnected".into(),
        }
    }

    pub fn shared(zones: ZoneSet) -> SharedDashboard {
        Arc::new(RwLock::new(Self::new(zones)))
    }

    pub fn apply_frame(&mut self, result: FrameResult, metrics: FrameMetrics) {
        self.snapshot = result.snapshot;
        self.targets = result.targets;
        self.visible_targets = result.visible;
        self.occupied_zones = result.occupied_zones;
        self.zones = result.zones;
        self.stats = result.stats;
        self.metrics = metrics;
    }

    /// Refreshes counters for frames that produced no result.
    pub fn set_metrics(&mut self, metrics: FrameMetrics) {
        self.metrics = metrics;
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        self.status = if connected {
            "Connected".into()
        } else {
            "Disconnected".into()
        };
    }
}

impl Default for DashboardModel {
    fn default() -> Self {
        Self::new(ZoneSet::default())
    }
}
