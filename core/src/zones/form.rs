use crate::prelude::{ZoneError, ZoneResult};
use crate::zones::model::{Zone, ZoneMode, ZoneSet, ZONE_COUNT};
use serde::{Deserialize, Serialize};

/// Parses one coordinate text field as whole millimetres.
pub fn parse_coordinate(field: &str, text: &str) -> ZoneResult<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| ZoneError::InvalidNumber {
            field: field.to_string(),
            value: text.to_string(),
        })
}

/// Raw editor contents for a single zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneForm {
    pub enabled: bool,
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
}

impl ZoneForm {
    /// Parses every field, returning one error per malformed field.
    pub fn parse(&self, index: usize) -> Result<Zone, Vec<ZoneError>> {
        let field = |name: &str| format!("zone{index}.{name}");
        let results = [
            parse_coordinate(&field("x1"), &self.x1),
            parse_coordinate(&field("y1"), &self.y1),
            parse_coordinate(&field("x2"), &self.x2),
            parse_coordinate(&field("y2"), &self.y2),
        ];

        let mut values = [0; 4];
        let mut errors = Vec::new();
        for (slot, result) in values.iter_mut().zip(results) {
            match result {
                Ok(value) => *slot = value,
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let [x1, y1, x2, y2] = values;
        Ok(Zone {
            enabled: self.enabled,
            x1,
            y1,
            x2,
            y2,
        })
    }
}

impl From<&Zone> for ZoneForm {
    fn from(zone: &Zone) -> Self {
        Self {
            enabled: zone.enabled,
            x1: zone.x1.to_string(),
            y1: zone.y1.to_string(),
            x2: zone.x2.to_string(),
            y2: zone.y2.to_string(),
        }
    }
}

/// Raw editor contents for the whole zone configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSetForm {
    pub mode: u8,
    pub zones: [ZoneForm; ZONE_COUNT],
}

impl ZoneSetForm {
    pub fn parse(&self) -> Result<ZoneSet, Vec<ZoneError>> {
        let mut errors = Vec::new();

        let mode = ZoneMode::try_from(self.mode).unwrap_or_else(|err| {
            errors.push(err);
            ZoneMode::Disabled
        });

        let mut zones = [Zone::default(); ZONE_COUNT];
        for (idx, (slot, form)) in zones.iter_mut().zip(&self.zones).enumerate() {
            match form.parse(idx + 1) {
                Ok(zone) => *slot = zone,
                Err(mut field_errors) => errors.append(&mut field_errors),
            }
        }

        if errors.is_empty() {
            Ok(ZoneSet::new(mode, zones))
        } else {
            Err(errors)
        }
    }
}

impl From<&ZoneSet> for ZoneSetForm {
    fn from(set: &ZoneSet) -> Self {
        Self {
            mode: set.mode.code(),
            zones: [
                ZoneForm::from(&set.zones[0]),
                ZoneForm::from(&set.zones[1]),
                ZoneForm::from(&set.zones[2]),
            ],
        }
    }
}

impl Default for ZoneSetForm {
    fn default() -> Self {
        Self::from(&ZoneSet::default())
    }
}
