use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub object: Srgba<f64>,
    pub shadow: Srgba<f64>,
    pub north: Srgba<f64>,
    pub sun: Srgba<f64>,
    pub hint: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            object: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.85, 0.85, 0.85, 1.0),
                Some(1.0),
            ),
            shadow: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.2, 0.2, 0.25, 0.45),
                Some(0.45),
            ),
            north: Self::lookup_color(
                context,
                "error_bg_color",
                Srgba::new(0.85, 0.2, 0.2, 1.0),
                Some(1.0),
            ),
            sun: Self::lookup_color(
                context,
                "warning_bg_color",
                Srgba::new(0.95, 0.75, 0.2, 1.0),
                Some(1.0),
            ),
            hint: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.7, 0.7, 0.7, 0.8),
                Some(0.8),
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.gnomon-display {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
