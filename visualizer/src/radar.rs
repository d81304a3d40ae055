use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use ld2450core::zones::{SensorBounds, Target, Zone, ZONE_COUNT};

const ZONE_COLORS: [(f32, f32, f32); ZONE_COUNT] = [
    (0.35, 0.65, 1.0),
    (0.82, 0.60, 0.13),
    (0.97, 0.32, 0.29),
];

/// Plan view of the sensor field with zones and targets.
#[derive(Clone)]
pub struct RadarView {
    pub zones: Vec<Zone>,
    pub targets: Vec<Target>,
    pub visible: Vec<Target>,
    pub active_zone: usize,
}

struct Projection {
    width: f32,
    height: f32,
}

impl Projection {
    fn scale_x(&self) -> f32 {
        self.width / (SensorBounds::X_MAX - SensorBounds::X_MIN) as f32
    }

    fn scale_y(&self) -> f32 {
        self.height / (SensorBounds::Y_MAX - SensorBounds::Y_MIN) as f32
    }

    // sensor sits at the bottom centre
    fn to_canvas(&self, x: i32, y: i32) -> Point {
        Point::new(
            self.width / 2.0 + x as f32 * self.scale_x(),
            self.height - (y - SensorBounds::Y_MIN) as f32 * self.scale_y(),
        )
    }
}

impl<Message> canvas::Program<Message> for RadarView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.13, 0.15, 0.18),
        );

        let projection = Projection {
            width: bounds.width,
            height: bounds.height,
        };

        let grid = Path::new(|builder| {
            for x in (SensorBounds::X_MIN..=SensorBounds::X_MAX).step_by(1000) {
                builder.move_to(projection.to_canvas(x, SensorBounds::Y_MIN));
                builder.line_to(projection.to_canvas(x, SensorBounds::Y_MAX));
            }
            for y in (SensorBounds::Y_MIN..=SensorBounds::Y_MAX).step_by(1000) {
                builder.move_to(projection.to_canvas(SensorBounds::X_MIN, y));
                builder.line_to(projection.to_canvas(SensorBounds::X_MAX, y));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.19, 0.21, 0.24)),
        );

        for (idx, zone) in self.zones.iter().enumerate().take(ZONE_COUNT) {
            let (r, g, b) = ZONE_COLORS[idx];
            let (min_x, max_x, min_y, max_y) = zone.bounds();
            let top_left = projection.to_canvas(min_x, max_y);
            let bottom_right = projection.to_canvas(max_x, min_y);
            let rect = Path::rectangle(
                top_left,
                Size::new(bottom_right.x - top_left.x, bottom_right.y - top_left.y),
            );

            if zone.enabled {
                frame.fill(&rect, Color::from_rgba(r, g, b, 0.2));
            }
            let width = if idx + 1 == self.active_zone { 3.0 } else { 1.5 };
            let alpha = if zone.enabled { 1.0 } else { 0.35 };
            frame.stroke(
                &rect,
                Stroke::default()
                    .with_width(width)
                    .with_color(Color::from_rgba(r, g, b, alpha)),
            );
        }

        let sensor = Path::new(|builder| builder.circle(projection.to_canvas(0, 0), 6.0));
        frame.fill(&sensor, Color::from_rgb(0.35, 0.65, 1.0));

        for target in &self.targets {
            let kept = self.visible.contains(target);
            let color = if kept {
                Color::from_rgb(0.25, 0.73, 0.31)
            } else {
                Color::from_rgb(0.43, 0.46, 0.51)
            };
            let marker =
                Path::new(|builder| builder.circle(projection.to_canvas(target.x, target.y), 7.0));
            frame.fill(&marker, color);
        }

        vec![frame.into_geometry()]
    }
}
