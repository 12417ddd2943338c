use crate::config;
use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use chrono::Utc;
use std::time::Duration;
use umbra::sample::GeoFix;

const REFIX_INTERVAL: Duration = Duration::from_secs(60);

/// Emits geoposition fixes while consent is granted, watch-position style:
/// one immediately on grant, then one per interval, re-reading the config
/// each round so coordinate edits take effect. A grant without configured
/// coordinates reports a single failure and waits for the next grant.
pub async fn run_location_service(tx: Sender<AppEvent>, consent_rx: Receiver<bool>) {
    let mut allowed = false;
    loop {
        if !allowed {
            match consent_rx.recv().await {
                Ok(granted) => allowed = granted,
                Err(_) => return,
            }
            continue;
        }

        match acquire() {
            Some(fix) => {
                if tx.send(AppEvent::GeoFix(fix)).await.is_err() {
                    return;
                }
            }
            None => {
                log::warn!("No coordinates configured; reporting geolocation failure");
                if tx.send(AppEvent::GeoError).await.is_err() {
                    return;
                }
                allowed = false;
                continue;
            }
        }

        tokio::select! {
            changed = consent_rx.recv() => match changed {
                Ok(granted) => allowed = granted,
                Err(_) => return,
            },
            _ = tokio::time::sleep(REFIX_INTERVAL) => {}
        }
    }
}

fn acquire() -> Option<GeoFix> {
    let config = config::load_or_setup();
    match (config.latitude, config.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoFix {
            timestamp: Utc::now(),
            latitude,
            longitude,
        }),
        _ => None,
    }
}
