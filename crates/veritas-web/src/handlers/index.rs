//! The HTML form.

use axum::{extract::State, response::Html};
use minijinja::context;
use veritas_core::CANDIDATE_LABELS;

use crate::error::ApiError;
use crate::state::SharedState;

pub async fn index_page(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let template = state.templates.get_template("index.html")?;
    let html = template.render(context! {
        labels => CANDIDATE_LABELS,
        local_model => state.service.local_model_id(),
        remote_model => state.service.remote_model_id(),
    })?;
    Ok(Html(html))
}
