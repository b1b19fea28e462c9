//! veritas-web — Axum front end for the news analysis service.
//!
//! Serves the HTML form at `/`, the JSON endpoint at `/analyze` and a
//! liveness probe at `/health`. The binary in `main.rs` wires the real
//! classifiers; tests build the router around doubles.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
