use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub backdrop: Srgba<f64>,
    pub scrim: Srgba<f64>,
    pub placeholder: Srgba<f64>,
    pub title: Srgba<f64>,
    pub caption: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            backdrop: Self::lookup_color(
                context,
                "theme_bg_color",
                Srgba::new(0.08, 0.08, 0.1, 1.0),
                Some(1.0),
            ),
            scrim: Self::lookup_color(
                context,
                "theme_bg_color",
                Srgba::new(0.05, 0.05, 0.07, 0.45),
                Some(0.45),
            ),
            placeholder: Self::lookup_color(
                context,
                "theme_unfocused_bg_color",
                Srgba::new(0.25, 0.25, 0.3, 1.0),
                Some(1.0),
            ),
            title: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.95, 0.95, 0.95, 1.0),
                None,
            ),
            caption: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.8, 0.8, 0.8, 0.7),
                Some(0.7),
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
                Srgba::new(
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    alpha_override.unwrap_or(c.alpha() as f64),
                )
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.vitrine-controls {
    margin: 12px;
}
.vitrine-dot {
    min-width: 10px;
    min-height: 10px;
    padding: 0;
    border-radius: 5px;
    background: alpha(@theme_fg_color, 0.3);
}
.vitrine-dot.active {
    background: @theme_selected_bg_color;
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
