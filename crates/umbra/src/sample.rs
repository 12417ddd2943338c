use crate::geometry::Heading;
use chrono::{DateTime, Utc};

/// One wholesale orientation event from the feed. The primary `heading`
/// field and the platform-specific `compass_fallback` field may each be
/// absent independently.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationEvent {
    pub heading: Option<f64>,
    pub compass_fallback: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
}

impl OrientationEvent {
    /// Resolves the effective compass bearing. The primary field wins
    /// whenever it is present; a primary of exactly 0 degrees is a valid fix
    /// and does not yield to the fallback.
    pub fn resolve(self) -> OrientationSample {
        OrientationSample {
            heading: self.heading.or(self.compass_fallback).map(Heading::new),
            pitch: self.pitch,
            roll: self.roll,
        }
    }
}

/// Latest known device orientation. Replaced wholesale on every event,
/// never merged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    pub heading: Option<Heading>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
}

/// A geolocation fix. Absence of a fix is a distinct state from a reported
/// failure; both are tracked by the engine, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_heading_wins_over_fallback() {
        let event = OrientationEvent {
            heading: Some(12.0),
            compass_fallback: Some(340.0),
            ..Default::default()
        };
        assert_eq!(event.resolve().heading.map(Heading::degrees), Some(12.0));
    }

    #[test]
    fn zero_heading_is_a_valid_fix() {
        let event = OrientationEvent {
            heading: Some(0.0),
            compass_fallback: Some(340.0),
            ..Default::default()
        };
        assert_eq!(event.resolve().heading.map(Heading::degrees), Some(0.0));
    }

    #[test]
    fn fallback_fills_in_for_a_missing_primary() {
        let event = OrientationEvent {
            heading: None,
            compass_fallback: Some(340.0),
            pitch: Some(1.0),
            roll: None,
        };
        let sample = event.resolve();
        assert_eq!(sample.heading.map(Heading::degrees), Some(340.0));
        assert_eq!(sample.pitch, Some(1.0));
    }

    #[test]
    fn no_fields_means_no_heading() {
        assert_eq!(OrientationEvent::default().resolve().heading, None);
    }
}
