//! Library entrypoint for StockWatch.
//!
//! Split out from `main.rs` so integration tests under `tests/` can build
//! the app state, routers, controllers and services directly.

pub mod config;
pub mod error;
pub mod models;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub monitor: Arc<services::monitor::MonitorState>,
}
