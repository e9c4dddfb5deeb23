//! The search screen as an explicit state machine.
//!
//! `Idle -> Loading -> Result | Error`, and from `Result`/`Error` back to
//! `Loading` on the next submission. The GTK layer only renders whatever
//! state this holds.

use thiserror::Error;

use crate::errors::{FetchError, SummaryError};
use crate::gbif::FetchResult;
use crate::plot::MapPlot;
use crate::spinner::Spinner;
use crate::summary::{summarize, Summary};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesView {
    pub query: String,
    pub summary: Summary,
    pub plot: MapPlot,
    pub gbif_url: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading { query: String, spinner: Spinner },
    Result(SpeciesView),
    Error { query: String, error: ViewError },
}

#[derive(Debug)]
pub enum Event {
    Submit(String),
    /// Spinner tick from the timer started for the given search generation.
    Tick(u64),
    Completed(FetchResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartSearch(String),
}

#[derive(Debug, Default)]
pub struct ViewModel {
    state: ViewState,
    last_query: String,
    generation: u64,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }

    /// Counter bumped by every search that starts.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a timer started for `generation` should keep ticking.
    pub fn animates(&self, generation: u64) -> bool {
        self.is_loading() && self.generation == generation
    }

    pub fn spinner_glyph(&self) -> Option<&'static str> {
        match &self.state {
            ViewState::Loading { spinner, .. } => Some(spinner.glyph()),
            _ => None,
        }
    }

    /// Applies one event. Returns a command when the caller has work to start.
    pub fn handle(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::Submit(query) => self.submit(query),
            Event::Tick(generation) => {
                if generation != self.generation {
                    return None;
                }
                if let ViewState::Loading { spinner, .. } = &mut self.state {
                    spinner.tick();
                }
                None
            }
            Event::Completed(result) => {
                self.complete(result);
                None
            }
        }
    }

    fn submit(&mut self, query: String) -> Option<Command> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        if self.is_loading() {
            tracing::debug!(%query, "search already in flight, ignoring submission");
            return None;
        }

        tracing::info!(%query, "starting species search");
        self.last_query = query.clone();
        self.generation += 1;
        self.state = ViewState::Loading {
            query: query.clone(),
            spinner: Spinner::default(),
        };
        Some(Command::StartSearch(query))
    }

    fn complete(&mut self, result: FetchResult) {
        let ViewState::Loading { query, .. } = &self.state else {
            tracing::debug!("search result arrived outside of loading, ignoring");
            return;
        };
        let query = query.clone();

        self.state = match result {
            Ok(table) => match summarize(&table) {
                Ok(summary) => ViewState::Result(SpeciesView {
                    plot: MapPlot::from_table(&table, &query),
                    gbif_url: table.gbif_page_url(),
                    summary,
                    query,
                }),
                Err(e) => ViewState::Error {
                    query,
                    error: e.into(),
                },
            },
            Err(e) => ViewState::Error {
                query,
                error: e.into(),
            },
        };
    }
}
