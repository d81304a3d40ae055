use ld2450core::zones::SensorBounds;

/// Advances one coordinate by `velocity`, reflecting off `[min, max]`.
///
/// Returns the new position and the (possibly reversed) velocity.
pub fn bounce(position: i32, velocity: i32, min: i32, max: i32) -> (i32, i32) {
    let next = position + velocity;
    if next < min {
        (min + (min - next), -velocity)
    } else if next > max {
        (max - (next - max), -velocity)
    } else {
        (next, velocity)
    }
}

/// Straight-line walk through the sensor field, reflecting at its edges.
pub fn walk(start: (i32, i32), velocity: (i32, i32), steps: usize) -> Vec<(i32, i32)> {
    let (mut x, mut y) = start;
    let (mut vx, mut vy) = velocity;
    let mut path = Vec::with_capacity(steps);
    for _ in 0..steps {
        path.push((x, y));
        (x, vx) = bounce(x, vx, SensorBounds::X_MIN, SensorBounds::X_MAX);
        // keep clear of y = 0 so a walker never collapses into an empty slot
        (y, vy) = bounce(y, vy, SensorBounds::Y_MIN + 100, SensorBounds::Y_MAX);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_reflects_at_edges() {
        assert_eq!(bounce(2900, 200, -3000, 3000), (2900, -200));
        assert_eq!(bounce(-2950, -100, -3000, 3000), (-2950, 100));
        assert_eq!(bounce(0, 250, -3000, 3000), (250, 250));
    }

    #[test]
    fn walk_stays_inside_sensor_field() {
        let path = walk((2800, 5900), (350, 420), 200);
        assert_eq!(path.len(), 200);
        for (x, y) in path {
            assert!(SensorBounds::x_in_range(x));
            assert!(SensorBounds::y_in_range(y));
            assert!(y >= 100);
        }
    }
}
