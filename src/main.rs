use gtk::prelude::*;
use gtk::glib;
use libadwaita::{prelude::*, Application, ApplicationWindow, ColorScheme, HeaderBar, StyleManager, ToolbarView};
use species_mapper::config::FetchConfig;
use species_mapper::data::APP_ID;
use species_mapper::gbif::GbifClient;
use species_mapper::screen::SearchScreen;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> glib::ExitCode {
    // RUST_LOG overrides the default info level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Load the fetch settings once, shared by every search
    let source = Arc::new(GbifClient::new(FetchConfig::load()));
    tracing::info!(
        api_url = %source.config().api_url,
        record_limit = source.config().record_limit,
        human_observation_only = source.config().human_observation_only,
        "starting species mapper"
    );

    // Create a new application
    let app = Application::builder()
        .application_id(APP_ID)
        .build();

    app.connect_activate(move |app| build_ui(app, source.clone()));

    app.run()
}

fn build_ui(app: &Application, source: Arc<GbifClient>) {
    // Set the application to prefer dark mode
    let style_manager = StyleManager::default();
    style_manager.set_color_scheme(ColorScheme::PreferDark);

    // Create the search screen
    let screen = SearchScreen::new(source);

    // Create the header bar and toolbar view
    let header_bar = HeaderBar::builder()
        .build();

    let toolbar_view = ToolbarView::builder()
        .build();
    toolbar_view.add_top_bar(&header_bar);
    toolbar_view.set_content(Some(screen.widget()));

    // Create the main window
    let window = ApplicationWindow::builder()
        .application(app)
        .title("Species Distribution Mapper")
        .default_width(1200)
        .default_height(800)
        .width_request(1000)
        .height_request(600)
        .build();

    // Add custom CSS for the form, map overlays and info panel
    let css_provider = gtk::CssProvider::new();
    css_provider.load_from_data(
        ".entry-form {
            background-color: alpha(@card_bg_color, 0.6);
            border-radius: 12px;
            padding: 8px 12px;
        }
        .spinner-glyph {
            font-family: monospace;
            font-size: 48px;
            font-weight: 700;
        }
        .occurrence-dot {
            background-color: alpha(@accent_bg_color, 0.75);
            border-radius: 50%;
            min-width: 0;
            min-height: 0;
        }
        .map-legend {
            background-color: alpha(@window_bg_color, 0.85);
            border-radius: 8px;
            padding: 6px 10px;
            box-shadow: 0 2px 6px alpha(black, 0.4);
        }
        .graticule-label {
            font-size: 10px;
            color: alpha(@window_fg_color, 0.6);
        }
        .legend-label {
            font-style: italic;
            font-weight: 600;
        }
        .info-countries {
            font-weight: 600;
        }
        .info-line {
            font-family: monospace;
        }"
    );

    gtk::style_context_add_provider_for_display(
        &gtk::prelude::WidgetExt::display(&window),
        &css_provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );

    // Set the window content and show it
    window.set_content(Some(&toolbar_view));
    window.present();
}
