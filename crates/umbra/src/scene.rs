use crate::geometry::{self, Point, Viewport};
use crate::sample::{GeoFix, OrientationSample};
use crate::solar::{self, SolarEphemeris, SolarPosition};
use chrono::{DateTime, TimeZone, Utc};
use std::f64::consts::PI;

// All radii are fractions of the viewport min dimension.
pub const OBJECT_RADIUS: f64 = 0.04;
pub const NORTH_DOT_RADIUS: f64 = 0.005;
pub const NORTH_ORBIT: f64 = 0.7; // north indicator orbital radius
pub const SUN_DOT_RADIUS: f64 = 0.02;
pub const SUN_ORBIT: f64 = 0.6; // nominal sun orbit, shrinks with altitude
pub const SHADOW_REACH: f64 = 4.0; // projection gain toward the horizon

/// A projected shadow ellipse. `rotation_degrees` turns the ellipse about
/// the viewport center so it points away from the sun's bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub rotation_degrees: f64,
    pub hour_offset: u32,
}

/// Positions the north indicator for the current compass heading, or `None`
/// without a fix (the caller keeps the previous position).
pub fn position_north_indicator(
    orientation: &OrientationSample,
    viewport: &Viewport,
) -> Option<Point> {
    let heading = orientation.heading?;
    Some(geometry::point_on_orbit(
        viewport,
        NORTH_ORBIT,
        heading.to_trig_angle(),
    ))
}

/// Positions the sun indicator. The orbit radius shrinks with the cosine of
/// the sun's altitude, so an overhead sun sits at the viewport center.
pub fn position_sun_indicator(
    orientation: &OrientationSample,
    sun: &SolarPosition,
    viewport: &Viewport,
) -> Option<Point> {
    let heading = orientation.heading?;
    let angle = 1.5 * PI + heading.degrees().to_radians() - sun.azimuth;
    let reach = SUN_ORBIT * sun.altitude.cos() * viewport.min_dimension / 2.0;
    Some(Point::new(
        viewport.width / 2.0 + (-angle).cos() * reach,
        viewport.height / 2.0 + (-angle).sin() * reach,
    ))
}

/// Projects the shadow fan: one ellipse per whole hour in `0..=duration`
/// for which the sun stands above the horizon at the sampled wall-clock
/// time. Offsets are evaluated independently; a below-horizon hour in the
/// middle of the span leaves a gap without ending the fan.
pub fn compute_shadows<Tz, E>(
    ephemeris: &E,
    orientation: &OrientationSample,
    geo: &GeoFix,
    viewport: &Viewport,
    duration_hours: u32,
    reference: DateTime<Tz>,
) -> Vec<Shadow>
where
    Tz: TimeZone,
    E: SolarEphemeris,
{
    let Some(heading) = orientation.heading else {
        return Vec::new();
    };

    let mut shadows = Vec::new();
    for hour_offset in 0..=duration_hours {
        let sampled = solar::add_wall_hours(reference.clone(), i64::from(hour_offset));
        let Some(sun) = ephemeris.solar_position(
            sampled.with_timezone(&Utc),
            geo.latitude,
            geo.longitude,
        ) else {
            continue;
        };

        let length =
            SHADOW_REACH / sun.altitude.sin() * (OBJECT_RADIUS / 2.0) * viewport.min_dimension;
        // Below the horizon the projection turns negative; exactly on it the
        // division blows up. Neither is a drawable shadow.
        if !length.is_finite() || length <= 0.0 {
            continue;
        }

        shadows.push(Shadow {
            center: Point::new(
                viewport.width / 2.0,
                viewport.height / 2.0 - OBJECT_RADIUS * viewport.min_dimension + length / 2.0,
            ),
            radius_x: OBJECT_RADIUS * viewport.min_dimension,
            radius_y: length / 2.0,
            rotation_degrees: sun.azimuth.to_degrees() - 180.0 - heading.degrees(),
            hour_offset,
        });
    }
    shadows
}
