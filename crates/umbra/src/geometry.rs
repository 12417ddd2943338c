use derive_more::{Display, From, Into};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Compass bearing in degrees, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Display, From, Into)]
pub struct Heading(f64);

impl Heading {
    pub fn new(degrees: f64) -> Self {
        Self(degrees)
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn to_trig_angle(self) -> f64 {
        trig_angle(self.0)
    }
}

/// Size of the display surface. `min_dimension` scales every orbit radius
/// and shadow length so the scene fits the short side of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub min_dimension: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            width,
            height,
            min_dimension: width.min(height),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Converts a clockwise-from-north compass bearing into a counter-clockwise
/// trigonometric angle. Screen coordinates put north "up" while angle 0
/// points "right".
pub fn trig_angle(compass_degrees: f64) -> f64 {
    1.5 * PI - compass_degrees.to_radians()
}

/// Places a point at `orbit_fraction` of the half min dimension from the
/// viewport center. The angle is negated because screen Y grows downward.
pub fn point_on_orbit(viewport: &Viewport, orbit_fraction: f64, angle: f64) -> Point {
    let reach = orbit_fraction * viewport.min_dimension / 2.0;
    Point::new(
        viewport.width / 2.0 + (-angle).cos() * reach,
        viewport.height / 2.0 - (-angle).sin() * reach,
    )
}
