use crate::generator::template::walk;
use anyhow::{ensure, Context};
use ld2450core::sensor_interface::{TelemetryRecord, TARGET_SLOTS};
use ld2450core::zones::{is_point_in_zone, ZoneSet};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating synthetic LD2450 telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub frames: usize,
    pub targets: usize,
    pub max_step_mm: i32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            frames: 20,
            targets: 2,
            max_step_mm: 250,
            seed: 0,
        }
    }
}

fn random_step(rng: &mut StdRng, max_step: i32) -> i32 {
    let magnitude = rng.gen_range(20..=max_step.max(20));
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

fn build_paths(config: &GeneratorConfig) -> Vec<Vec<(i32, i32)>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.targets)
        .map(|_| {
            let start = (rng.gen_range(-2500..=2500), rng.gen_range(500..=5500));
            let velocity = (
                random_step(&mut rng, config.max_step_mm),
                random_step(&mut rng, config.max_step_mm),
            );
            walk(start, velocity, config.frames)
        })
        .collect()
}

fn distance(x: i32, y: i32) -> f64 {
    f64::from(x).hypot(f64::from(y)).round()
}

/// Builds one frame; `zones` only feeds the per-zone occupancy flags.
fn build_record(positions: &[(i32, i32)], zones: &ZoneSet) -> TelemetryRecord {
    let mut slots = [(0, 0); TARGET_SLOTS];
    for (slot, position) in slots.iter_mut().zip(positions) {
        *slot = *position;
    }

    let occupied = |index: usize| {
        let zone = &zones.zones[index];
        zone.enabled
            && positions
                .iter()
                .any(|&(x, y)| is_point_in_zone(x, y, zone))
    };

    let [(x1, y1), (x2, y2), (x3, y3)] = slots;
    TelemetryRecord {
        ld2450_target_count: Some(positions.len() as u32),
        occupancy_ld2450: Some(!positions.is_empty()),
        position_reporting: Some(true),
        zone1_occupied: Some(occupied(0)),
        zone2_occupied: Some(occupied(1)),
        zone3_occupied: Some(occupied(2)),
        target1_x: Some(x1),
        target1_y: Some(y1),
        target1_distance: Some(distance(x1, y1)),
        target2_x: Some(x2),
        target2_y: Some(y2),
        target2_distance: Some(distance(x2, y2)),
        target3_x: Some(x3),
        target3_y: Some(y3),
        target3_distance: Some(distance(x3, y3)),
    }
}

pub fn build_telemetry_records(
    config: &GeneratorConfig,
    zones: &ZoneSet,
) -> anyhow::Result<Vec<TelemetryRecord>> {
    ensure!(
        config.targets <= TARGET_SLOTS,
        "the sensor reports at most {} targets, got {}",
        TARGET_SLOTS,
        config.targets
    );

    let paths = build_paths(config);
    let records = (0..config.frames)
        .map(|frame| {
            let positions: Vec<(i32, i32)> = paths.iter().map(|path| path[frame]).collect();
            build_record(&positions, zones)
        })
        .collect();
    Ok(records)
}

/// Synthetic frames serialized exactly as Zigbee2MQTT publishes them.
pub fn build_telemetry_payloads(
    config: &GeneratorConfig,
    zones: &ZoneSet,
) -> anyhow::Result<Vec<Vec<u8>>> {
    build_telemetry_records(config, zones)?
        .iter()
        .map(|record| serde_json::to_vec(record).context("serializing synthetic frame"))
        .collect()
}
