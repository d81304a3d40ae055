pub use crate::sensor_interface::{SensorSnapshot, TelemetryRecord};
pub use crate::zones::{
    SensorBounds, Target, ValidationReport, Zone, ZoneEngine, ZoneMode, ZoneSet, ZoneStats,
};

/// Common error type for zone parsing, validation and wire decoding.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("unknown zone mode: {0}")]
    UnknownMode(u8),
    #[error("zone index out of range: {0}")]
    ZoneIndex(usize),
    #[error("zone {zone} is invalid: {}", errors.join("; "))]
    Invalid { zone: usize, errors: Vec<String> },
    #[error("telemetry decode failure: {0}")]
    Decode(String),
}

pub type ZoneResult<T> = Result<T, ZoneError>;
