use crate::geometry::{Point, Viewport};
use crate::sample::{GeoFix, OrientationEvent, OrientationSample};
use crate::scene::{self, Shadow};
use crate::solar::SolarEphemeris;
use chrono::Local;

/// Source of the display surface size, `(0, 0)` while not yet mounted.
pub trait ViewportSizeProvider {
    fn surface_size(&self) -> (f64, f64);
}

/// Persisted geolocation consent. The engine never reads or writes it; the
/// application gates the geolocation feed on it and mirrors the decision
/// into the engine via [`Engine::set_geolocation_permitted`].
pub trait ConsentStore {
    fn geolocation_allowed(&self) -> bool;
    fn set_geolocation_allowed(&self, allowed: bool);
}

/// External inputs the engine reacts to. Each trigger's transition runs to
/// completion before the next one is processed; there is no idle work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    SurfaceResized,
    Orientation(OrientationEvent),
    GeoFix(GeoFix),
    GeoError,
    Duration(u32),
}

/// The current visualization state, refreshed in place after each trigger.
/// Indicators hold their last computed position while the inputs they need
/// are missing; the shadow fan is withheld entirely without a compass fix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub viewport: Viewport,
    pub north_indicator: Option<Point>,
    pub sun_indicator: Option<Point>,
    pub shadows: Vec<Shadow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum GeoAvailability {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

pub struct Engine<E, V> {
    ephemeris: E,
    surface: V,
    duration_hours: u32,
    orientation: OrientationSample,
    geoposition: Option<GeoFix>,
    geo_availability: GeoAvailability,
    geo_permitted: bool,
    snapshot: Snapshot,
}

impl<E, V> Engine<E, V>
where
    E: SolarEphemeris,
    V: ViewportSizeProvider,
{
    pub fn new(ephemeris: E, surface: V, duration_hours: u32) -> Self {
        let mut engine = Self {
            ephemeris,
            surface,
            duration_hours,
            orientation: OrientationSample::default(),
            geoposition: None,
            geo_availability: GeoAvailability::default(),
            geo_permitted: false,
            snapshot: Snapshot::default(),
        };
        engine.refresh_viewport();
        engine
    }

    pub fn apply(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::SurfaceResized => self.refresh_viewport(),
            Trigger::Orientation(event) => {
                self.refresh_viewport();
                self.orientation = event.resolve();
                self.reposition_north();
                self.reposition_sun();
                self.reproject_shadows();
            }
            Trigger::GeoFix(fix) => {
                self.refresh_viewport();
                self.geoposition = Some(fix);
                self.geo_availability = GeoAvailability::Available;
                self.reposition_sun();
                self.reproject_shadows();
            }
            Trigger::GeoError => {
                self.geo_availability = GeoAvailability::Unavailable;
            }
            Trigger::Duration(hours) => {
                self.duration_hours = hours;
                self.reproject_shadows();
            }
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    pub fn compass_available(&self) -> bool {
        self.orientation.heading.is_some()
    }

    pub fn geolocation_available(&self) -> bool {
        self.geo_availability == GeoAvailability::Available
    }

    pub fn geolocation_permitted(&self) -> bool {
        self.geo_permitted
    }

    pub fn set_geolocation_permitted(&mut self, allowed: bool) {
        self.geo_permitted = allowed;
    }

    fn refresh_viewport(&mut self) {
        let (width, height) = self.surface.surface_size();
        self.snapshot.viewport = Viewport::new(width, height);
    }

    fn reposition_north(&mut self) {
        if let Some(point) =
            scene::position_north_indicator(&self.orientation, &self.snapshot.viewport)
        {
            self.snapshot.north_indicator = Some(point);
        }
    }

    fn reposition_sun(&mut self) {
        let Some(geo) = self.geoposition else {
            return;
        };
        let Some(sun) =
            self.ephemeris
                .solar_position(geo.timestamp, geo.latitude, geo.longitude)
        else {
            return;
        };
        if let Some(point) =
            scene::position_sun_indicator(&self.orientation, &sun, &self.snapshot.viewport)
        {
            self.snapshot.sun_indicator = Some(point);
        }
    }

    fn reproject_shadows(&mut self) {
        let Some(geo) = self.geoposition else {
            self.snapshot.shadows.clear();
            return;
        };
        // Hour offsets advance in the host's local wall clock, like the
        // original hour-field arithmetic.
        let reference = geo.timestamp.with_timezone(&Local);
        self.snapshot.shadows = scene::compute_shadows(
            &self.ephemeris,
            &self.orientation,
            &geo,
            &self.snapshot.viewport,
            self.duration_hours,
            reference,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::SolarPosition;
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeSurface(Rc<Cell<(f64, f64)>>);

    impl FakeSurface {
        fn sized(width: f64, height: f64) -> Self {
            let surface = Self::default();
            surface.0.set((width, height));
            surface
        }
    }

    impl ViewportSizeProvider for FakeSurface {
        fn surface_size(&self) -> (f64, f64) {
            self.0.get()
        }
    }

    /// Day/night schedule: above the horizon for the first `daylight` whole
    /// hours after the reference, below afterwards.
    struct DaySchedule {
        reference: DateTime<Utc>,
        daylight: i64,
    }

    impl DaySchedule {
        fn new(daylight: i64) -> Self {
            Self {
                reference: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
                daylight,
            }
        }
    }

    impl SolarEphemeris for DaySchedule {
        fn solar_position(&self, at: DateTime<Utc>, _: f64, _: f64) -> Option<SolarPosition> {
            let hour = (at - self.reference).num_hours();
            let altitude = if hour < self.daylight { 0.9 } else { -0.3 };
            Some(SolarPosition {
                azimuth: 0.2,
                altitude,
            })
        }
    }

    fn orientation(heading: f64) -> Trigger {
        Trigger::Orientation(OrientationEvent {
            heading: Some(heading),
            ..Default::default()
        })
    }

    fn geo_fix(ephemeris: &DaySchedule) -> Trigger {
        Trigger::GeoFix(GeoFix {
            timestamp: ephemeris.reference,
            latitude: 47.0,
            longitude: 8.0,
        })
    }

    fn engine(daylight: i64) -> Engine<DaySchedule, FakeSurface> {
        Engine::new(DaySchedule::new(daylight), FakeSurface::sized(400.0, 400.0), 3)
    }

    #[test]
    fn starts_empty_with_a_measured_viewport() {
        let engine = engine(6);
        assert_eq!(engine.snapshot().viewport.min_dimension, 400.0);
        assert_eq!(engine.snapshot().north_indicator, None);
        assert_eq!(engine.snapshot().sun_indicator, None);
        assert!(engine.snapshot().shadows.is_empty());
        assert!(!engine.compass_available());
        assert!(!engine.geolocation_available());
    }

    #[test]
    fn orientation_alone_places_only_the_north_indicator() {
        let mut engine = engine(6);
        engine.apply(orientation(90.0));
        assert!(engine.compass_available());
        assert!(engine.snapshot().north_indicator.is_some());
        assert_eq!(engine.snapshot().sun_indicator, None);
        assert!(engine.snapshot().shadows.is_empty());
    }

    #[test]
    fn fix_and_orientation_produce_the_full_scene() {
        let mut engine = engine(6);
        let fix = geo_fix(&DaySchedule::new(6));
        engine.apply(orientation(0.0));
        engine.apply(fix);
        assert!(engine.geolocation_available());
        assert!(engine.snapshot().sun_indicator.is_some());
        assert_eq!(engine.snapshot().shadows.len(), 4);
    }

    #[test]
    fn sunset_inside_the_span_truncates_the_fan() {
        let mut engine = engine(2);
        engine.apply(orientation(0.0));
        engine.apply(geo_fix(&DaySchedule::new(2)));
        assert_eq!(
            engine
                .snapshot()
                .shadows
                .iter()
                .map(|s| s.hour_offset)
                .collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn losing_the_compass_clears_shadows_but_keeps_indicators() {
        let mut engine = engine(6);
        engine.apply(orientation(45.0));
        engine.apply(geo_fix(&DaySchedule::new(6)));
        let north = engine.snapshot().north_indicator;
        let sun = engine.snapshot().sun_indicator;

        engine.apply(Trigger::Orientation(OrientationEvent::default()));
        assert!(!engine.compass_available());
        assert!(engine.snapshot().shadows.is_empty());
        assert_eq!(engine.snapshot().north_indicator, north);
        assert_eq!(engine.snapshot().sun_indicator, sun);
    }

    #[test]
    fn geo_error_only_flips_availability() {
        let mut engine = engine(6);
        engine.apply(orientation(10.0));
        engine.apply(geo_fix(&DaySchedule::new(6)));
        let before = engine.snapshot().clone();

        engine.apply(Trigger::GeoError);
        assert!(!engine.geolocation_available());
        assert_eq!(engine.snapshot(), &before);
    }

    #[test]
    fn duration_change_recomputes_the_fan_only() {
        let mut engine = engine(6);
        engine.apply(orientation(0.0));
        engine.apply(geo_fix(&DaySchedule::new(6)));
        let north = engine.snapshot().north_indicator;

        engine.apply(Trigger::Duration(1));
        assert_eq!(engine.duration_hours(), 1);
        assert_eq!(engine.snapshot().shadows.len(), 2);
        assert_eq!(engine.snapshot().north_indicator, north);
    }

    #[test]
    fn sensor_events_refresh_the_viewport_defensively() {
        let surface = FakeSurface::sized(400.0, 400.0);
        let mut engine = Engine::new(DaySchedule::new(6), surface.clone(), 3);
        surface.0.set((800.0, 600.0));

        engine.apply(orientation(0.0));
        assert_eq!(engine.snapshot().viewport.min_dimension, 600.0);
    }

    #[test]
    fn resize_recomputes_the_viewport_only() {
        let surface = FakeSurface::sized(400.0, 400.0);
        let mut engine = Engine::new(DaySchedule::new(6), surface.clone(), 3);
        engine.apply(orientation(0.0));
        engine.apply(geo_fix(&DaySchedule::new(6)));
        let shadows = engine.snapshot().shadows.clone();

        surface.0.set((1000.0, 1000.0));
        engine.apply(Trigger::SurfaceResized);
        assert_eq!(engine.snapshot().viewport.width, 1000.0);
        // Geometry recomputes on the next sensor event, not on resize.
        assert_eq!(engine.snapshot().shadows, shadows);
    }

    #[test]
    fn identical_triggers_are_idempotent() {
        let mut a = engine(6);
        let mut b = engine(6);
        for engine in [&mut a, &mut b] {
            engine.apply(orientation(123.4));
            engine.apply(geo_fix(&DaySchedule::new(6)));
        }
        assert_eq!(a.snapshot(), b.snapshot());

        let before = a.snapshot().clone();
        a.apply(orientation(123.4));
        assert_eq!(a.snapshot(), &before);
    }

    #[test]
    fn consent_flag_mirrors_into_queries() {
        let mut engine = engine(6);
        assert!(!engine.geolocation_permitted());
        engine.set_geolocation_permitted(true);
        assert!(engine.geolocation_permitted());
    }
}
