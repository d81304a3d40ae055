//! Zone semantics and wire records for the LD2450 radar configurator.
//!
//! Classification, validation and summary operations are pure functions over
//! an immutable [`zones::ZoneSet`] snapshot; transport and rendering live in
//! the `bridge` and `visualizer` crates.

pub mod prelude;
pub mod sensor_interface;
pub mod telemetry;
pub mod zones;

pub use prelude::{ZoneError, ZoneResult};
