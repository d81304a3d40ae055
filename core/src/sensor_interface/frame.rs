use crate::prelude::{ZoneError, ZoneResult};
use crate::zones::model::{Target, ZONE_COUNT};
use serde::{Deserialize, Serialize};

/// Number of target slots reported per frame.
pub const TARGET_SLOTS: usize = 3;

/// One telemetry message as published by Zigbee2MQTT.
///
/// The device sends partial updates, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ld2450_target_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_ld2450: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_reporting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone1_occupied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone2_occupied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone3_occupied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target1_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target1_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target1_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target2_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target2_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target2_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target3_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target3_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target3_distance: Option<f64>,
}

impl TelemetryRecord {
    fn zone_occupancy(&self) -> [Option<bool>; ZONE_COUNT] {
        [self.zone1_occupied, self.zone2_occupied, self.zone3_occupied]
    }

    fn slots(&self) -> [(Option<i32>, Option<i32>, Option<f64>); TARGET_SLOTS] {
        [
            (self.target1_x, self.target1_y, self.target1_distance),
            (self.target2_x, self.target2_y, self.target2_distance),
            (self.target3_x, self.target3_y, self.target3_distance),
        ]
    }
}

pub fn decode_telemetry(payload: &[u8]) -> ZoneResult<TelemetryRecord> {
    serde_json::from_slice(payload).map_err(|err| ZoneError::Decode(err.to_string()))
}

/// Raw position stored for one target slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotPosition {
    pub x: i32,
    pub y: i32,
    pub distance: f64,
}

/// Last known value of every telemetry field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub target_count: u32,
    pub occupancy: bool,
    pub position_reporting: bool,
    pub zone_occupied: [bool; ZONE_COUNT],
    pub positions: [SlotPosition; TARGET_SLOTS],
}

impl SensorSnapshot {
    /// Returns a new snapshot with the fields present in `record` applied.
    pub fn merge(&self, record: &TelemetryRecord) -> Self {
        let mut next = self.clone();

        if let Some(count) = record.ld2450_target_count {
            next.target_count = count;
        }
        if let Some(occupancy) = record.occupancy_ld2450 {
            next.occupancy = occupancy;
        }
        if let Some(reporting) = record.position_reporting {
            next.position_reporting = reporting;
        }
        for (slot, update) in next.zone_occupied.iter_mut().zip(record.zone_occupancy()) {
            if let Some(occupied) = update {
                *slot = occupied;
            }
        }
        for (slot, (x, y, distance)) in next.positions.iter_mut().zip(record.slots()) {
            if let Some(x) = x {
                slot.x = x;
            }
            if let Some(y) = y {
                slot.y = y;
            }
            if let Some(distance) = distance {
                slot.distance = distance;
            }
        }

        next
    }

    /// Targets in slot order; a slot at (0, 0) is empty.
    pub fn targets(&self) -> Vec<Target> {
        self.positions
            .iter()
            .map(|slot| Target::new(slot.x, slot.y, slot.distance))
            .filter(Target::is_present)
            .collect()
    }
}
