use crate::prelude::{ZoneError, ZoneResult};
use crate::zones::model::{SensorBounds, Zone, ZoneSet};
use serde::{Deserialize, Serialize};

/// Outcome of checking one zone. Every violated constraint is listed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Converts into an error tagged with the 1-based zone index.
    pub fn into_result(self, zone: usize) -> ZoneResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ZoneError::Invalid {
                zone,
                errors: self.errors,
            })
        }
    }
}

pub fn validate_zone(zone: &Zone) -> ValidationReport {
    let mut errors = Vec::new();

    if !SensorBounds::x_in_range(zone.x1) {
        errors.push("X1 must be between -3000 and 3000mm".to_string());
    }
    if !SensorBounds::x_in_range(zone.x2) {
        errors.push("X2 must be between -3000 and 3000mm".to_string());
    }
    if !SensorBounds::y_in_range(zone.y1) {
        errors.push("Y1 must be between 0 and 6000mm".to_string());
    }
    if !SensorBounds::y_in_range(zone.y2) {
        errors.push("Y2 must be between 0 and 6000mm".to_string());
    }
    if zone.x1 == zone.x2 || zone.y1 == zone.y2 {
        errors.push("Zone must have non-zero area".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Validates all zones, returning `(index, report)` pairs with 1-based indices.
pub fn validate_zone_set(zone_set: &ZoneSet) -> Vec<(usize, ValidationReport)> {
    zone_set
        .zones
        .iter()
        .enumerate()
        .map(|(idx, zone)| (idx + 1, validate_zone(zone)))
        .collect()
}

/// First invalid zone as an error, checked in zone order.
pub fn ensure_zone_set_valid(zone_set: &ZoneSet) -> ZoneResult<()> {
    validate_zone_set(zone_set)
        .into_iter()
        .try_for_each(|(idx, report)| report.into_result(idx))
}
