use crate::config;
use crate::events::AppEvent;
use crate::sys::{location, server};
use async_channel::Sender;
use std::thread;
use tokio::runtime::Runtime;
use umbra::sample::OrientationEvent;

/// Starts the background services on their own thread and returns the
/// sender the app uses to push consent changes to the location service.
pub fn start_background_services(tx: Sender<AppEvent>) -> Sender<bool> {
    let (consent_tx, consent_rx) = async_channel::unbounded();

    thread::spawn(move || {
        let rt = Runtime::new().expect("Failed to create Tokio runtime");

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    server::run_server(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    config::run_async_watcher(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    location::run_location_service(tx, consent_rx).await;
                });
            }

            emit_startup_sample(tx).await;

            std::future::pending::<()>().await;
        });
    });

    consent_tx
}

/// A configured fixed heading substitutes for the first compass event on
/// machines without an orientation feed.
async fn emit_startup_sample(tx: Sender<AppEvent>) {
    let config = config::load_or_setup();
    if let Some(heading) = config.fixed_heading {
        let event = OrientationEvent {
            heading: Some(heading.degrees()),
            ..Default::default()
        };
        let _ = tx.send(AppEvent::Orientation(event)).await;
    }
}
