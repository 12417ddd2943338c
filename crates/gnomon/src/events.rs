use umbra::sample::{GeoFix, OrientationEvent};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Orientation(OrientationEvent),
    GeoFix(GeoFix),
    GeoError,
    Consent(bool),
    Duration(u32),
    ConfigReload,
}
