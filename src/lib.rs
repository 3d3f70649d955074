pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod reports;
pub mod routes;
pub mod services;

pub use config::Config;

use reports::{ReportComposer, Renderer};

/// Shared per-worker application state.
#[derive(Clone)]
pub struct AppState {
    pub composer: ReportComposer,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(composer: ReportComposer, renderer: Renderer) -> Self {
        Self { composer, renderer }
    }
}
