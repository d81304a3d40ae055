use crate::prelude::{ZoneError, ZoneResult};
use serde::{Deserialize, Serialize};

/// Measurement envelope of the LD2450 in sensor-relative millimetres.
pub struct SensorBounds;

impl SensorBounds {
    pub const X_MIN: i32 = -3000;
    pub const X_MAX: i32 = 3000;
    pub const Y_MIN: i32 = 0;
    pub const Y_MAX: i32 = 6000;

    pub fn x_in_range(x: i32) -> bool {
        (Self::X_MIN..=Self::X_MAX).contains(&x)
    }

    pub fn y_in_range(y: i32) -> bool {
        (Self::Y_MIN..=Self::Y_MAX).contains(&y)
    }
}

/// Number of zones the firmware exposes.
pub const ZONE_COUNT: usize = 3;

/// Rectangle spanned by two opposite corners. Corners may come in either
/// diagonal orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub enabled: bool,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Zone {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            enabled: true,
            x1,
            y1,
            x2,
            y2,
        }
    }

    pub fn disabled(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            enabled: false,
            ..Self::new(x1, y1, x2, y2)
        }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Normalized `(min_x, max_x, min_y, max_y)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        (
            self.x1.min(self.x2),
            self.x1.max(self.x2),
            self.y1.min(self.y2),
            self.y1.max(self.y2),
        )
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::disabled(-1500, 0, 1500, 3000)
    }
}

/// How enabled zones affect which targets are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ZoneMode {
    #[default]
    Disabled,
    DetectionOnly,
    FilterExclude,
}

impl ZoneMode {
    pub fn code(self) -> u8 {
        match self {
            ZoneMode::Disabled => 0,
            ZoneMode::DetectionOnly => 1,
            ZoneMode::FilterExclude => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoneMode::Disabled => "disabled",
            ZoneMode::DetectionOnly => "detection",
            ZoneMode::FilterExclude => "filter",
        }
    }

    pub const ALL: [ZoneMode; 3] = [
        ZoneMode::Disabled,
        ZoneMode::DetectionOnly,
        ZoneMode::FilterExclude,
    ];
}

impl From<ZoneMode> for u8 {
    fn from(mode: ZoneMode) -> Self {
        mode.code()
    }
}

impl TryFrom<u8> for ZoneMode {
    type Error = ZoneError;

    fn try_from(code: u8) -> ZoneResult<Self> {
        match code {
            0 => Ok(ZoneMode::Disabled),
            1 => Ok(ZoneMode::DetectionOnly),
            2 => Ok(ZoneMode::FilterExclude),
            other => Err(ZoneError::UnknownMode(other)),
        }
    }
}

impl std::fmt::Display for ZoneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The three firmware zones plus the mode selector.
///
/// Instances are treated as immutable snapshots: the `replace_*`/`with_*`
/// helpers return a new set instead of editing fields in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneSet {
    pub mode: ZoneMode,
    pub zones: [Zone; ZONE_COUNT],
}

impl ZoneSet {
    pub fn new(mode: ZoneMode, zones: [Zone; ZONE_COUNT]) -> Self {
        Self { mode, zones }
    }

    pub fn with_mode(self, mode: ZoneMode) -> Self {
        Self { mode, ..self }
    }

    /// Returns a copy with zone `index` (1-based) replaced.
    pub fn replace_zone(self, index: usize, zone: Zone) -> ZoneResult<Self> {
        if !(1..=ZONE_COUNT).contains(&index) {
            return Err(ZoneError::ZoneIndex(index));
        }
        let mut zones = self.zones;
        zones[index - 1] = zone;
        Ok(Self { zones, ..self })
    }

    pub fn enabled_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|zone| zone.enabled)
    }
}

/// One detected object for a single sensor frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: i32,
    pub y: i32,
    pub distance: f64,
    pub speed: f64,
}

impl Target {
    pub fn new(x: i32, y: i32, distance: f64) -> Self {
        Self {
            x,
            y,
            distance,
            speed: 0.0,
        }
    }

    /// Targets at (0, 0) encode an empty slot on the wire.
    pub fn is_present(&self) -> bool {
        self.x != 0 || self.y != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_zone_set_matches_factory_configuration() {
        let set = ZoneSet::default();
        assert_eq!(set.mode, ZoneMode::Disabled);
        for zone in &set.zones {
            assert!(!zone.enabled);
            assert_eq!((zone.x1, zone.y1, zone.x2, zone.y2), (-1500, 0, 1500, 3000));
        }
    }

    #[test]
    fn zone_bounds_normalize_corner_orientation() {
        let zone = Zone::new(1000, 2500, -500, 200);
        assert_eq!(zone.bounds(), (-500, 1000, 200, 2500));
    }

    #[test]
    fn mode_codes_round_trip_and_reject_unknown() {
        for mode in ZoneMode::ALL {
            assert_eq!(ZoneMode::try_from(mode.code()), Ok(mode));
        }
        assert_eq!(ZoneMode::try_from(3), Err(ZoneError::UnknownMode(3)));
    }

    #[test]
    fn replace_zone_returns_new_set_and_leaves_original() {
        let original = ZoneSet::default();
        let updated = original
            .replace_zone(2, Zone::new(0, 0, 500, 500))
            .unwrap();
        assert!(!original.zones[1].enabled);
        assert!(updated.zones[1].enabled);
        assert_eq!(updated.zones[0], original.zones[0]);
        assert_eq!(
            original.replace_zone(4, Zone::default()),
            Err(ZoneError::ZoneIndex(4))
        );
        assert_eq!(
            original.replace_zone(0, Zone::default()),
            Err(ZoneError::ZoneIndex(0))
        );
    }

    #[test]
    fn zone_set_serializes_mode_as_integer_code() {
        let set = ZoneSet::default().with_mode(ZoneMode::FilterExclude);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["mode"], 2);
        let back: ZoneSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn origin_target_is_an_empty_slot() {
        assert!(!Target::new(0, 0, 0.0).is_present());
        assert!(Target::new(0, 5, 5.0).is_present());
        assert!(Target::new(-5, 0, 5.0).is_present());
    }
}
