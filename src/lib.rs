//! Local Library catalog
//!
//! A server-rendered web application for managing a small library catalog:
//! books, their authors and genres, and the physical copies on the shelves.

use axum::response::Response;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn views::Renderer>,
}

impl AppState {
    /// Render or redirect according to what the controller returned
    pub fn respond(&self, page: views::Page) -> AppResult<Response> {
        views::respond(self.renderer.as_ref(), page)
    }
}
