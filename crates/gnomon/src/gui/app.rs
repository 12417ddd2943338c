use crate::config::{self, Config, FileConsentStore};
use crate::events::AppEvent;
use crate::gui::scene::{self, Status};
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use umbra::engine::{ConsentStore, Engine, Trigger, ViewportSizeProvider};
use umbra::sample::{GeoFix, OrientationEvent};
use umbra::solar::Spa;

/// Surface size shared between the resize handler and the engine's
/// defensive viewport refresh.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSize(Rc<Cell<(f64, f64)>>);

impl SurfaceSize {
    pub fn set(&self, width: f64, height: f64) {
        self.0.set((width, height));
    }
}

impl ViewportSizeProvider for SurfaceSize {
    fn surface_size(&self) -> (f64, f64) {
        self.0.get()
    }
}

type ShadowEngine = Engine<Spa, SurfaceSize>;

pub struct AppModel {
    pub engine: Rc<RefCell<ShadowEngine>>,
    pub surface: SurfaceSize,
    pub consent_tx: async_channel::Sender<bool>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Resized(f64, f64),
    Orientation(OrientationEvent),
    GeoFix(GeoFix),
    GeoError,
    Consent(bool),
    Duration(u32),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Orientation(e) => AppMsg::Orientation(e),
            AppEvent::GeoFix(fix) => AppMsg::GeoFix(fix),
            AppEvent::GeoError => AppMsg::GeoError,
            AppEvent::Consent(allowed) => AppMsg::Consent(allowed),
            AppEvent::Duration(hours) => AppMsg::Duration(hours),
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

fn status(engine: &ShadowEngine) -> Status {
    Status {
        compass_available: engine.compass_available(),
        geolocation_permitted: engine.geolocation_permitted(),
        geolocation_available: engine.geolocation_available(),
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        Config,
        async_channel::Sender<bool>,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Gnomon"),
            set_default_size: (640, 640),
            add_css_class: "gnomon-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        relm4::main_application().quit();
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "gnomon-display",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resized(width as f64, height as f64));
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, consent_tx, rx) = init;

        theme::load_css();

        let surface = SurfaceSize::default();
        let duration = config.duration_hours.min(config::MAX_DURATION_HOURS);
        let mut engine = Engine::new(Spa, surface.clone(), duration);
        engine.set_geolocation_permitted(FileConsentStore.geolocation_allowed());
        let engine = Rc::new(RefCell::new(engine));

        let model = AppModel {
            engine: engine.clone(),
            surface,
            consent_tx,
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let engine_draw = engine.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                let engine = engine_draw.borrow();
                if let Err(e) = scene::draw(cr, engine.snapshot(), status(&engine), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Resized(width, height) => {
                self.surface.set(width, height);
                self.engine.borrow_mut().apply(Trigger::SurfaceResized);
            }
            AppMsg::Orientation(event) => {
                self.engine.borrow_mut().apply(Trigger::Orientation(event));
            }
            AppMsg::GeoFix(fix) => {
                self.engine.borrow_mut().apply(Trigger::GeoFix(fix));
            }
            AppMsg::GeoError => {
                self.engine.borrow_mut().apply(Trigger::GeoError);
            }
            AppMsg::Consent(allowed) => {
                FileConsentStore.set_geolocation_allowed(allowed);
                self.engine
                    .borrow_mut()
                    .set_geolocation_permitted(allowed);
                // Wake the location service so it (re)acquires or stops.
                let _ = self.consent_tx.send_blocking(allowed);
                log::info!(
                    "Geolocation consent {}",
                    if allowed { "granted" } else { "revoked" }
                );
            }
            AppMsg::Duration(hours) => {
                let hours = hours.min(config::MAX_DURATION_HOURS);
                self.engine.borrow_mut().apply(Trigger::Duration(hours));
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    {
                        let hours = new_config.duration_hours.min(config::MAX_DURATION_HOURS);
                        let mut engine = self.engine.borrow_mut();
                        if engine.duration_hours() != hours {
                            engine.apply(Trigger::Duration(hours));
                        }
                    }
                    // Re-acquire so coordinate edits take effect.
                    if FileConsentStore.geolocation_allowed() {
                        let _ = self.consent_tx.send_blocking(true);
                    }
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
        self.drawing_area.queue_draw();
    }
}
