//! Shared application state for the web server.

use std::sync::Arc;

use minijinja::Environment;
use veritas_core::AnalysisService;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub service: AnalysisService,
    pub templates: Environment<'static>,
}

impl AppState {
    pub fn new(service: AnalysisService) -> Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { service, templates })
    }
}

pub type SharedState = Arc<AppState>;
