pub mod command;
pub mod frame;

pub use command::{command_topic, PositionReportingCommand, ZoneConfigCommand};
pub use frame::{decode_telemetry, SensorSnapshot, SlotPosition, TelemetryRecord, TARGET_SLOTS};
