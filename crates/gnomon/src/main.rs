use gnomon::config::{self, FileConsentStore};
use gnomon::gui::app::AppModel;
use gnomon::sys::runtime;
use relm4::prelude::*;
use umbra::engine::ConsentStore;

fn main() {
    env_logger::init();

    let config = config::load_or_setup();

    let (tx, rx) = async_channel::bounded(32);
    let consent_tx = runtime::start_background_services(tx);

    // Seed the location service with the persisted consent decision.
    let _ = consent_tx.send_blocking(FileConsentStore.geolocation_allowed());

    let app = RelmApp::new("org.umbra.gnomon");

    app.run::<AppModel>((config, consent_tx, rx));
}
