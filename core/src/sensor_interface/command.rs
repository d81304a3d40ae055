use crate::zones::model::ZoneSet;
use serde::{Deserialize, Serialize};

/// Topic suffix the device listens on for configuration writes.
pub const SET_TOPIC_SUFFIX: &str = "set";

pub fn command_topic(base_topic: &str) -> String {
    format!("{}/{}", base_topic.trim_end_matches('/'), SET_TOPIC_SUFFIX)
}

/// Flat zone configuration write understood by the firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfigCommand {
    pub zone_type: u8,
    pub zone1_enabled: bool,
    pub zone1_x1: i32,
    pub zone1_y1: i32,
    pub zone1_x2: i32,
    pub zone1_y2: i32,
    pub zone2_enabled: bool,
    pub zone2_x1: i32,
    pub zone2_y1: i32,
    pub zone2_x2: i32,
    pub zone2_y2: i32,
    pub zone3_enabled: bool,
    pub zone3_x1: i32,
    pub zone3_y1: i32,
    pub zone3_x2: i32,
    pub zone3_y2: i32,
}

impl ZoneConfigCommand {
    pub fn from_zone_set(set: &ZoneSet) -> Self {
        let [z1, z2, z3] = set.zones;
        Self {
            zone_type: set.mode.code(),
            zone1_enabled: z1.enabled,
            zone1_x1: z1.x1,
            zone1_y1: z1.y1,
            zone1_x2: z1.x2,
            zone1_y2: z1.y2,
            zone2_enabled: z2.enabled,
            zone2_x1: z2.x1,
            zone2_y1: z2.y1,
            zone2_x2: z2.x2,
            zone2_y2: z2.y2,
            zone3_enabled: z3.enabled,
            zone3_x1: z3.x1,
            zone3_y1: z3.y1,
            zone3_x2: z3.x2,
            zone3_y2: z3.y2,
        }
    }
}

/// Enables or disables per-target position telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionReportingCommand {
    pub position_reporting: bool,
}

impl PositionReportingCommand {
    pub fn new(enabled: bool) -> Self {
        Self {
            position_reporting: enabled,
        }
    }

    /// Command flipping the last reported state.
    pub fn toggle(current: bool) -> Self {
        Self::new(!current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::model::{Zone, ZoneMode};
    use serde_json::json;

    #[test]
    fn zone_config_serializes_to_flat_firmware_keys() {
        let set = ZoneSet::new(
            ZoneMode::FilterExclude,
            [
                Zone::new(-1000, 0, 1000, 2000),
                Zone::default(),
                Zone::new(2500, 5000, 500, 4000),
            ],
        );
        let value = serde_json::to_value(ZoneConfigCommand::from_zone_set(&set)).unwrap();
        assert_eq!(
            value,
            json!({
                "zone_type": 2,
                "zone1_enabled": true,
                "zone1_x1": -1000, "zone1_y1": 0, "zone1_x2": 1000, "zone1_y2": 2000,
                "zone2_enabled": false,
                "zone2_x1": -1500, "zone2_y1": 0, "zone2_x2": 1500, "zone2_y2": 3000,
                "zone3_enabled": true,
                "zone3_x1": 2500, "zone3_y1": 5000, "zone3_x2": 500, "zone3_y2": 4000
            })
        );
    }

    #[test]
    fn position_reporting_toggle_negates_current_state() {
        assert_eq!(
            serde_json::to_value(PositionReportingCommand::toggle(false)).unwrap(),
            json!({ "position_reporting": true })
        );
        assert!(!PositionReportingCommand::toggle(true).position_reporting);
    }

    #[test]
    fn command_topic_appends_set_suffix() {
        assert_eq!(command_topic("zigbee2mqtt/SHS01"), "zigbee2mqtt/SHS01/set");
        assert_eq!(command_topic("zigbee2mqtt/SHS01/"), "zigbee2mqtt/SHS01/set");
    }
}
