use crate::events::AppEvent;
use async_channel::Sender;
use chrono::Utc;
use std::str::FromStr;
use strum::EnumString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;
use umbra::sample::{GeoFix, OrientationEvent};

pub const SOCKET_PATH: &str = "/tmp/gnomon.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
enum Keyword {
    Orientation,
    Geo,
    GeoError,
    Consent,
    Duration,
}

/// Accepts newline-delimited sensor and control commands from companion
/// feeds (typically the `umbra` CLI):
///
/// ```text
/// orientation <alpha|-> <beta|-> <gamma|-> [compass <degrees>]
/// geo <latitude> <longitude>
/// geo-error
/// consent <allow|revoke>
/// duration <hours>
/// ```
pub async fn run_server(tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_line(line.trim()) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    return;
                                }
                            }
                            None => log::warn!("Ignoring malformed command: {:?}", line),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

fn parse_line(line: &str) -> Option<AppEvent> {
    let mut words = line.split_whitespace();
    let keyword = Keyword::from_str(words.next()?).ok()?;
    let args: Vec<&str> = words.collect();

    match keyword {
        Keyword::Orientation => parse_orientation(&args),
        Keyword::Geo => match args[..] {
            [latitude, longitude] => Some(AppEvent::GeoFix(GeoFix {
                timestamp: Utc::now(),
                latitude: latitude.parse().ok()?,
                longitude: longitude.parse().ok()?,
            })),
            _ => None,
        },
        Keyword::GeoError => args.is_empty().then_some(AppEvent::GeoError),
        Keyword::Consent => match args[..] {
            ["allow"] => Some(AppEvent::Consent(true)),
            ["revoke"] => Some(AppEvent::Consent(false)),
            _ => None,
        },
        Keyword::Duration => match args[..] {
            [hours] => Some(AppEvent::Duration(hours.parse().ok()?)),
            _ => None,
        },
    }
}

fn parse_orientation(args: &[&str]) -> Option<AppEvent> {
    let (&[alpha, beta, gamma], tail) = args.split_first_chunk()?;
    let compass_fallback = match tail {
        [] => None,
        ["compass", degrees] => Some(degrees.parse().ok()?),
        _ => return None,
    };

    Some(AppEvent::Orientation(OrientationEvent {
        heading: axis(alpha)?,
        compass_fallback,
        pitch: axis(beta)?,
        roll: axis(gamma)?,
    }))
}

/// A sensor axis value: a float or `-` for "not delivered".
fn axis(token: &str) -> Option<Option<f64>> {
    if token == "-" {
        Some(None)
    } else {
        token.parse().map(Some).ok()
    }
}
