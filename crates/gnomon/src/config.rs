use directories::ProjectDirs;
use fs_err as fs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;
use umbra::engine::ConsentStore;

/// Upper bound applied wherever a duration reaches the engine; a full day
/// of shadows is already more than the display stays readable with.
pub const MAX_DURATION_HOURS: u32 = 24;

/// Cardinal bearing names accepted wherever a heading can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Direction {
    #[strum(serialize = "North", serialize = "n")]
    North,
    #[strum(serialize = "NorthEast", serialize = "ne")]
    NorthEast,
    #[strum(serialize = "East", serialize = "e")]
    East,
    #[strum(serialize = "SouthEast", serialize = "se")]
    SouthEast,
    #[strum(serialize = "South", serialize = "s")]
    South,
    #[strum(serialize = "SouthWest", serialize = "sw")]
    SouthWest,
    #[strum(serialize = "West", serialize = "w")]
    West,
    #[strum(serialize = "NorthWest", serialize = "nw")]
    NorthWest,
}

impl Direction {
    pub fn degrees(self) -> f64 {
        self as usize as f64 * 45.0
    }
}

/// A configured compass heading: either a cardinal name ("ne") or a bearing
/// in degrees ("135").
#[derive(Debug, Clone, Copy, PartialEq, SerializeDisplay, DeserializeFromStr)]
pub struct FixedHeading(f64);

impl FixedHeading {
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl fmt::Display for FixedHeading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FixedHeading {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(direction) = Direction::from_str(s) {
            return Ok(Self(direction.degrees()));
        }
        s.parse::<f64>()
            .map(Self)
            .map_err(|_| format!("not a cardinal direction or bearing: {s}"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Hour span of the shadow fan.
    pub duration_hours: u32,
    /// Manual coordinates for the geolocation service.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Emit one orientation sample with this heading at startup; useful on
    /// machines without a compass feed.
    pub fixed_heading: Option<FixedHeading>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_hours: 3,
            latitude: None,
            longitude: None,
            fixed_heading: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "umbra", "gnomon").ok_or(ConfigError::ConfigDirNotFound)
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("GNOMON"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_setup() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

/// Geolocation consent persisted as a single-word file in the config
/// directory, cached so the draw path never touches the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConsentStore;

static CONSENT: OnceLock<RwLock<Option<bool>>> = OnceLock::new();

const CONSENT_ALLOW: &str = "allow";
const CONSENT_REVOKE: &str = "revoke";

pub fn get_consent_path() -> Result<std::path::PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("consent"))
}

impl FileConsentStore {
    fn cache() -> &'static RwLock<Option<bool>> {
        CONSENT.get_or_init(|| RwLock::new(None))
    }

    fn read_disk() -> bool {
        get_consent_path()
            .ok()
            .and_then(|path| fs::read_to_string(path).ok())
            .is_some_and(|contents| contents.trim() == CONSENT_ALLOW)
    }
}

impl ConsentStore for FileConsentStore {
    fn geolocation_allowed(&self) -> bool {
        if let Some(allowed) = *Self::cache().read() {
            return allowed;
        }
        let allowed = Self::read_disk();
        *Self::cache().write() = Some(allowed);
        allowed
    }

    fn set_geolocation_allowed(&self, allowed: bool) {
        *Self::cache().write() = Some(allowed);
        let path = match get_consent_path() {
            Ok(p) => p,
            Err(e) => {
                log::error!("Failed to persist consent: {}", e);
                return;
            }
        };
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            log::error!("Failed to create config directory: {}", e);
            return;
        }
        let word = if allowed { CONSENT_ALLOW } else { CONSENT_REVOKE };
        if let Err(e) = fs::write(&path, word) {
            log::error!("Failed to persist consent: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_fixed_heading_deserialization() {
        let cases = vec![
            ("\"n\"", 0.0),
            ("\"North\"", 0.0),
            ("\"NE\"", 45.0),
            ("\"southwest\"", 225.0),
            ("\"w\"", 270.0),
            ("\"135\"", 135.0),
            ("\"12.5\"", 12.5),
        ];

        for (json, expected) in cases {
            let deserialized: FixedHeading = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.degrees(), expected);
        }
    }

    #[test]
    fn test_bogus_heading_is_rejected() {
        assert!(serde_json::from_str::<FixedHeading>("\"upwards\"").is_err());
    }

    #[test]
    fn test_direction_degrees_cover_the_circle() {
        let degrees: Vec<f64> = Direction::iter().map(Direction::degrees).collect();
        assert_eq!(
            degrees,
            vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.duration_hours, 3);
        assert_eq!(config.latitude, None);
        assert_eq!(config.fixed_heading, None);
    }

    #[test]
    fn test_config_round_trip() {
        let json = r#"{"duration-hours": 6, "latitude": 48.21, "longitude": 16.37, "fixed-heading": "ne"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.duration_hours, 6);
        assert_eq!(config.fixed_heading.map(FixedHeading::degrees), Some(45.0));
    }
}
