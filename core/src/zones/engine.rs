use crate::zones::model::{Target, Zone, ZoneMode, ZoneSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closed-rectangle containment; boundary points count as inside.
pub fn is_point_in_zone(x: i32, y: i32, zone: &Zone) -> bool {
    let (min_x, max_x, min_y, max_y) = zone.bounds();
    x >= min_x && x <= max_x && y >= min_y && y <= max_y
}

/// Decides whether a target survives the zone configuration.
///
/// Enabled zones are tested as an unordered union. With no zone enabled,
/// `DetectionOnly` rejects everything and `FilterExclude` accepts everything.
pub fn should_detect_target(target: &Target, zone_set: &ZoneSet) -> bool {
    if zone_set.mode == ZoneMode::Disabled {
        return true;
    }

    let in_any_zone = zone_set
        .enabled_zones()
        .any(|zone| is_point_in_zone(target.x, target.y, zone));

    match zone_set.mode {
        ZoneMode::DetectionOnly => in_any_zone,
        ZoneMode::FilterExclude => !in_any_zone,
        ZoneMode::Disabled => true,
    }
}

/// Returns the accepted targets in their original order.
pub fn filter_targets(targets: &[Target], zone_set: &ZoneSet) -> Vec<Target> {
    targets
        .iter()
        .filter(|target| should_detect_target(target, zone_set))
        .copied()
        .collect()
}

/// Display summary of a zone set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStats {
    pub total_zones: usize,
    pub enabled_zones: usize,
    pub mode: String,
}

pub fn zone_stats(zone_set: &ZoneSet) -> ZoneStats {
    ZoneStats {
        total_zones: zone_set.zones.len(),
        enabled_zones: zone_set.enabled_zones().count(),
        mode: zone_set.mode.label().to_string(),
    }
}

/// Zone classification bound to one configuration snapshot.
#[derive(Debug, Clone)]
pub struct ZoneEngine {
    config: Arc<ZoneSet>,
}

impl ZoneEngine {
    pub fn new(config: Arc<ZoneSet>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ZoneSet {
        &self.config
    }

    pub fn should_detect_target(&self, target: &Target) -> bool {
        should_detect_target(target, &self.config)
    }

    pub fn filter_targets(&self, targets: &[Target]) -> Vec<Target> {
        filter_targets(targets, &self.config)
    }

    pub fn zone_stats(&self) -> ZoneStats {
        zone_stats(&self.config)
    }

    /// 1-based indices of enabled zones that contain the target.
    pub fn occupied_zones(&self, target: &Target) -> Vec<usize> {
        self.config
            .zones
            .iter()
            .enumerate()
            .filter(|(_, zone)| zone.enabled && is_point_in_zone(target.x, target.y, zone))
            .map(|(idx, _)| idx + 1)
            .collect()
    }
}

impl From<ZoneSet> for ZoneEngine {
    fn from(config: ZoneSet) -> Self {
        Self::new(Arc::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_zone() -> Zone {
        Zone::new(-1500, 0, 1500, 3000)
    }

    fn single_zone_set(mode: ZoneMode) -> ZoneSet {
        ZoneSet::default()
            .with_mode(mode)
            .replace_zone(1, Zone::new(-1000, 0, 1000, 2000))
            .unwrap()
    }

    fn far_targets() -> Vec<Target> {
        vec![
            Target::new(0, 0, 0.0),
            Target::new(2999, 5999, 6708.0),
            Target::new(-100_000, 100_000, 141_421.0),
            Target::new(500, 1000, 1118.0),
        ]
    }

    #[test]
    fn containment_is_invariant_under_corner_swaps() {
        let zone = Zone::new(-800, 400, 1200, 2600);
        let swapped_x = Zone::new(zone.x2, zone.y1, zone.x1, zone.y2);
        let swapped_y = Zone::new(zone.x1, zone.y2, zone.x2, zone.y1);
        let swapped_both = Zone::new(zone.x2, zone.y2, zone.x1, zone.y1);
        for x in (-1000..=1400).step_by(200) {
            for y in (200..=2800).step_by(200) {
                let expected = is_point_in_zone(x, y, &zone);
                assert_eq!(is_point_in_zone(x, y, &swapped_x), expected);
                assert_eq!(is_point_in_zone(x, y, &swapped_y), expected);
                assert_eq!(is_point_in_zone(x, y, &swapped_both), expected);
            }
        }
    }

    #[test]
    fn containment_includes_boundary_points() {
        let zone = reference_zone();
        assert!(is_point_in_zone(-1500, 0, &zone));
        assert!(is_point_in_zone(1500, 3000, &zone));
        assert!(is_point_in_zone(0, 1500, &zone));
        assert!(!is_point_in_zone(-1501, 0, &zone));
        assert!(!is_point_in_zone(0, 3001, &zone));
    }

    #[test]
    fn containment_ignores_enabled_flag() {
        let zone = reference_zone().with_enabled(false);
        assert!(is_point_in_zone(0, 1500, &zone));
    }

    #[test]
    fn disabled_mode_detects_every_target() {
        let all_off = ZoneSet::default();
        let one_on = single_zone_set(ZoneMode::Disabled);
        for target in far_targets() {
            assert!(should_detect_target(&target, &all_off));
            assert!(should_detect_target(&target, &one_on));
        }
    }

    #[test]
    fn detection_only_with_no_enabled_zone_rejects_everything() {
        let set = ZoneSet::default().with_mode(ZoneMode::DetectionOnly);
        for target in far_targets() {
            assert!(!should_detect_target(&target, &set));
        }
    }

    #[test]
    fn filter_exclude_with_no_enabled_zone_accepts_everything() {
        let set = ZoneSet::default().with_mode(ZoneMode::FilterExclude);
        for target in far_targets() {
            assert!(should_detect_target(&target, &set));
        }
    }

    #[test]
    fn detection_only_keeps_targets_inside_enabled_zone() {
        let set = single_zone_set(ZoneMode::DetectionOnly);
        assert!(should_detect_target(&Target::new(500, 1000, 0.0), &set));
        assert!(!should_detect_target(&Target::new(2000, 1000, 0.0), &set));
    }

    #[test]
    fn filter_exclude_drops_targets_inside_enabled_zone() {
        let set = single_zone_set(ZoneMode::FilterExclude);
        assert!(!should_detect_target(&Target::new(500, 1000, 0.0), &set));
        assert!(should_detect_target(&Target::new(2000, 1000, 0.0), &set));
    }

    #[test]
    fn enabled_zones_compose_as_union() {
        let set = ZoneSet::new(
            ZoneMode::DetectionOnly,
            [
                Zone::new(-3000, 0, -1000, 1000),
                Zone::disabled(-500, 0, 500, 6000),
                Zone::new(1000, 4000, 3000, 6000),
            ],
        );
        assert!(should_detect_target(&Target::new(-2000, 500, 0.0), &set));
        assert!(should_detect_target(&Target::new(2000, 5000, 0.0), &set));
        // only inside the disabled zone
        assert!(!should_detect_target(&Target::new(0, 3000, 0.0), &set));

        let reordered = ZoneSet::new(
            ZoneMode::DetectionOnly,
            [set.zones[2], set.zones[0], set.zones[1]],
        );
        for target in far_targets() {
            assert_eq!(
                should_detect_target(&target, &set),
                should_detect_target(&target, &reordered)
            );
        }
    }

    #[test]
    fn filter_targets_preserves_order_and_never_grows() {
        let set = single_zone_set(ZoneMode::FilterExclude);
        let targets = vec![
            Target::new(2000, 1000, 2236.0),
            Target::new(500, 1000, 1118.0),
            Target::new(-2500, 4000, 4717.0),
        ];
        let kept = filter_targets(&targets, &set);
        assert!(kept.len() <= targets.len());
        assert_eq!(kept, vec![targets[0], targets[2]]);
        assert_eq!(targets.len(), 3);
        for target in &kept {
            assert!(targets.contains(target));
        }
    }

    #[test]
    fn stats_report_enabled_count_and_mode_label() {
        let set = ZoneSet::new(
            ZoneMode::DetectionOnly,
            [
                Zone::new(-1000, 0, 1000, 2000),
                Zone::default(),
                Zone::new(0, 0, 500, 500),
            ],
        );
        assert_eq!(
            zone_stats(&set),
            ZoneStats {
                total_zones: 3,
                enabled_zones: 2,
                mode: "detection".into(),
            }
        );
        assert_eq!(zone_stats(&ZoneSet::default()).mode, "disabled");
        assert_eq!(
            zone_stats(&ZoneSet::default().with_mode(ZoneMode::FilterExclude)).mode,
            "filter"
        );
    }

    #[test]
    fn stats_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(zone_stats(&ZoneSet::default())).unwrap();
        assert_eq!(json["totalZones"], 3);
        assert_eq!(json["enabledZones"], 0);
    }

    #[test]
    fn engine_reports_occupied_zone_indices() {
        let engine = ZoneEngine::from(ZoneSet::new(
            ZoneMode::Disabled,
            [
                Zone::new(-1000, 0, 1000, 2000),
                Zone::disabled(-1000, 0, 1000, 2000),
                Zone::new(0, 0, 3000, 3000),
            ],
        ));
        assert_eq!(engine.occupied_zones(&Target::new(500, 1000, 0.0)), vec![1, 3]);
        assert!(engine.occupied_zones(&Target::new(-2500, 5000, 0.0)).is_empty());
        assert!(engine.should_detect_target(&Target::new(-2500, 5000, 0.0)));
    }
}
