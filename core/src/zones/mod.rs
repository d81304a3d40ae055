pub mod cell;
pub mod engine;
pub mod form;
pub mod model;
pub mod validation;

pub use cell::ZoneConfigCell;
pub use engine::{
    filter_targets, is_point_in_zone, should_detect_target, zone_stats, ZoneEngine, ZoneStats,
};
pub use form::{parse_coordinate, ZoneForm, ZoneSetForm};
pub use model::{SensorBounds, Target, Zone, ZoneMode, ZoneSet, ZONE_COUNT};
pub use validation::{ensure_zone_set_valid, validate_zone, validate_zone_set, ValidationReport};
