use anyhow::Context;
use gtk::prelude::*;
use gtk::{glib, Align, Label, Orientation, ScrolledWindow};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::gbif::GbifClient;
use crate::map_view::create_map_view;
use crate::spinner::FRAME_INTERVAL;
use crate::task::SearchTask;
use crate::view_model::{Command, Event, SpeciesView, ViewModel, ViewState};

/// The single search screen: entry form on top, information panel and map
/// below. Widgets are rebuilt from the view model on every state change.
#[derive(Clone)]
pub struct SearchScreen {
    grid: gtk::Grid,
    model: Rc<RefCell<ViewModel>>,
    source: Arc<GbifClient>,
    spinner_label: Rc<RefCell<Option<Label>>>,
}

impl SearchScreen {
    pub fn new(source: Arc<GbifClient>) -> Self {
        // 3 columns: info panel spans the first two, the map takes the third
        let grid = gtk::Grid::builder()
            .row_spacing(10)
            .column_spacing(10)
            .margin_top(10)
            .margin_bottom(10)
            .margin_start(10)
            .margin_end(10)
            .hexpand(true)
            .vexpand(true)
            .build();

        let screen = Self {
            grid,
            model: Rc::new(RefCell::new(ViewModel::new())),
            source,
            spinner_label: Rc::new(RefCell::new(None)),
        };
        screen.render();
        screen
    }

    pub fn widget(&self) -> &gtk::Grid {
        &self.grid
    }

    fn submit(&self, query: String) {
        let command = self.model.borrow_mut().handle(Event::Submit(query));
        let Some(Command::StartSearch(query)) = command else {
            return;
        };

        self.render();
        let task = SearchTask::spawn(self.source.clone(), query);

        // Spinner timer, tied to this search's generation so a quick
        // resubmit never leaves two timers ticking the same spinner
        let generation = self.model.borrow().generation();
        let screen = self.clone();
        glib::timeout_add_local(FRAME_INTERVAL, move || {
            let glyph = {
                let mut model = screen.model.borrow_mut();
                if !model.animates(generation) {
                    return glib::ControlFlow::Break;
                }
                model.handle(Event::Tick(generation));
                model.spinner_glyph()
            };
            if let Some(glyph) = glyph {
                if let Some(label) = screen.spinner_label.borrow().as_ref() {
                    label.set_label(glyph);
                }
            }
            glib::ControlFlow::Continue
        });

        // Wait for the worker without blocking the main loop
        let screen = self.clone();
        glib::spawn_future_local(async move {
            tracing::debug!(query = task.query(), "waiting for search worker");
            let result = task.wait().await;
            screen.model.borrow_mut().handle(Event::Completed(result));
            screen.render();
        });
    }

    fn clear(&self) {
        // Remove every child, the next render attaches fresh widgets
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }
        self.spinner_label.borrow_mut().take();
    }

    fn render(&self) {
        self.clear();

        let (state, last_query) = {
            let model = self.model.borrow();
            (model.state().clone(), model.last_query().to_string())
        };

        match state {
            // Only the form before the first search
            ViewState::Idle => {
                self.grid.attach(&self.create_entry_form(&last_query), 0, 0, 3, 1);
            }
            ViewState::Loading { query, spinner } => {
                let loading = create_loading_view(&query, spinner.glyph());
                self.grid.attach(&loading.0, 0, 0, 3, 2);
                *self.spinner_label.borrow_mut() = Some(loading.1);
            }
            // Form on top, info panel on the left, map on the right
            ViewState::Result(view) => {
                self.grid.attach(&self.create_entry_form(&last_query), 0, 0, 3, 1);
                self.grid.attach(&create_information_panel(&view), 0, 1, 2, 1);
                self.grid.attach(&create_map_view(&view.plot), 2, 1, 1, 1);
            }
            ViewState::Error { query, error } => {
                tracing::info!(%query, "showing search error: {error}");
                self.grid.attach(&self.create_entry_form(&last_query), 0, 0, 3, 1);

                // Create the error message in place of the panel and map
                let error_label = Label::builder()
                    .label(error.to_string())
                    .wrap(true)
                    .hexpand(true)
                    .vexpand(true)
                    .valign(Align::Center)
                    .build();
                error_label.add_css_class("error");
                error_label.add_css_class("title-3");
                self.grid.attach(&error_label, 0, 1, 3, 1);
            }
        }
    }

    fn create_entry_form(&self, query: &str) -> gtk::Box {
        let form = gtk::Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(10)
            .hexpand(true)
            .build();
        form.add_css_class("entry-form");

        // Create the prompt, entry and search button
        let prompt = Label::builder()
            .label("Enter scientific name:")
            .build();
        form.append(&prompt);

        let entry = gtk::Entry::builder()
            .text(query)
            .placeholder_text("e.g. Engraulis ringens")
            .hexpand(true)
            .build();
        form.append(&entry);

        let button = gtk::Button::builder()
            .label("Search")
            .build();
        button.add_css_class("suggested-action");
        form.append(&button);

        // Enter and the button both submit the current text
        let screen = self.clone();
        entry.connect_activate(move |entry| {
            screen.submit(entry.text().to_string());
        });

        let screen = self.clone();
        let entry_for_button = entry.clone();
        button.connect_clicked(move |_| {
            screen.submit(entry_for_button.text().to_string());
        });

        form
    }
}

fn create_loading_view(query: &str, glyph: &str) -> (gtk::Box, Label) {
    let container = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(12)
        .hexpand(true)
        .vexpand(true)
        .valign(Align::Center)
        .build();

    // Create the spinner glyph, updated in place by the timer
    let glyph_label = Label::builder().label(glyph).build();
    glyph_label.add_css_class("spinner-glyph");
    container.append(&glyph_label);

    // Add the caption naming the species being searched
    let caption = Label::builder()
        .label(format!("Searching occurrences of {query}"))
        .build();
    caption.add_css_class("dim-label");
    container.append(&caption);

    (container, glyph_label)
}

fn create_information_panel(view: &SpeciesView) -> ScrolledWindow {
    // Create a scrolled window so long country lists stay reachable
    let scrolled_window = ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .vexpand(true)
        .build();

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(10)
        .margin_top(10)
        .margin_bottom(10)
        .margin_start(10)
        .margin_end(10)
        .build();

    // Create the panel title
    let title = Label::builder().label("Information").build();
    title.add_css_class("title-2");
    content.append(&title);

    // Extents first, then countries, then record details
    for (index, text) in view.summary.info_lines().into_iter().enumerate() {
        let label = Label::builder()
            .label(text)
            .justify(gtk::Justification::Center)
            .wrap(true)
            .build();
        // 0 and 1 are the extents, 2 the "Has been seen in" heading
        match index {
            3 => label.add_css_class("info-countries"),
            2 => {}
            _ => label.add_css_class("info-line"),
        }
        content.append(&label);
    }

    // Create the GBIF link button
    let gbif_button = gtk::Button::builder()
        .label("Open in GBIF")
        .halign(Align::Center)
        .build();
    let url = view.gbif_url.clone();
    gbif_button.connect_clicked(move |_| {
        if let Err(e) = open_in_browser(&url) {
            tracing::warn!("{e:#}");
        }
    });
    content.append(&gbif_button);

    scrolled_window.set_child(Some(&content));
    scrolled_window
}

fn open_in_browser(url: &str) -> anyhow::Result<()> {
    open::that(url).with_context(|| format!("failed to open {url}"))
}
