use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};

/// Sun position relative to an observer. Azimuth is measured from south,
/// increasing clockwise toward west; altitude from the horizon, negative
/// below it. Both in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

/// Solar ephemeris seam. Implementations must be deterministic for a given
/// input triple; `None` means no position could be computed, which callers
/// treat exactly like a missing geoposition.
pub trait SolarEphemeris {
    fn solar_position(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Option<SolarPosition>;
}

/// Ephemeris backed by the NREL solar position algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spa;

impl SolarEphemeris for Spa {
    fn solar_position(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Option<SolarPosition> {
        match spa::calc_solar_position(at, latitude, longitude) {
            // spa reports azimuth in degrees from north and a zenith angle;
            // the engine convention is radians from south and an altitude.
            Ok(position) => Some(SolarPosition {
                azimuth: (position.azimuth - 180.0).to_radians(),
                altitude: (90.0 - position.zenith_angle).to_radians(),
            }),
            Err(e) => {
                log::debug!(
                    "No solar position for ({}, {}) at {}: {:?}",
                    latitude,
                    longitude,
                    at,
                    e
                );
                None
            }
        }
    }
}

/// Advances a timestamp by whole wall-clock hours, the way a local calendar
/// hour field moves: across a DST transition the step follows the clock
/// rather than adding a fixed 3600 seconds. Ambiguous local times resolve to
/// the earliest instant; local times skipped by a transition fall back to
/// absolute addition.
pub fn add_wall_hours<Tz: TimeZone>(at: DateTime<Tz>, hours: i64) -> DateTime<Tz> {
    let zone = at.timezone();
    let shifted = at.naive_local() + Duration::hours(hours);
    match zone.from_local_datetime(&shifted) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => at + Duration::hours(hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn wall_hours_advance_utc() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 22, 30, 0).unwrap();
        let later = add_wall_hours(start, 3);
        assert_eq!(later, Utc.with_ymd_and_hms(2026, 1, 16, 1, 30, 0).unwrap());
    }

    #[test]
    fn wall_hours_respect_fixed_offsets() {
        let zone = FixedOffset::east_opt(5 * 3600).unwrap();
        let start = zone.with_ymd_and_hms(2026, 1, 15, 23, 0, 0).unwrap();
        let later = add_wall_hours(start, 2);
        assert_eq!(later.timezone(), zone);
        assert_eq!(later - start, Duration::hours(2));
    }

    #[test]
    fn equinox_noon_sun_stands_high_at_the_equator() {
        let noon = Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap();
        let position = Spa.solar_position(noon, 0.0, 0.0).unwrap();
        assert!(position.altitude > 1.4, "altitude {}", position.altitude);
        assert!(position.altitude <= FRAC_PI_2 + 1e-6);
    }

    #[test]
    fn midnight_sun_is_below_the_horizon() {
        let midnight = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
        let position = Spa.solar_position(midnight, 0.0, 0.0).unwrap();
        assert!(position.altitude < 0.0);
    }

    #[test]
    fn evening_sun_sits_west_of_south() {
        // 16:00 UTC at (0, 0): well past solar noon, azimuth toward west.
        let evening = Utc.with_ymd_and_hms(2026, 3, 20, 16, 0, 0).unwrap();
        let position = Spa.solar_position(evening, 0.0, 0.0).unwrap();
        assert!(position.azimuth > 0.0);
    }
}
