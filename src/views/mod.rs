//! Render boundary: controllers return a [`Page`], the router turns it into a
//! response through a [`Renderer`].

pub mod html;

use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub use html::HtmlRenderer;

/// A view name and the data it is rendered with
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: &'static str,
    pub data: Value,
}

impl View {
    pub fn new(name: &'static str, data: impl Serialize) -> AppResult<Self> {
        let data = serde_json::to_value(data)
            .map_err(|e| AppError::Internal(format!("view {} data: {}", name, e)))?;
        Ok(Self { name, data })
    }
}

/// What a controller decided to answer
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Render(View),
    Redirect(String),
}

impl Page {
    pub fn render(name: &'static str, data: impl Serialize) -> AppResult<Self> {
        View::new(name, data).map(Page::Render)
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Page::Redirect(url.into())
    }

    /// The rendered view, if any
    pub fn view(&self) -> Option<&View> {
        match self {
            Page::Render(view) => Some(view),
            Page::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Page::Redirect(url) => Some(url),
            Page::Render(_) => None,
        }
    }
}

pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, data: &Value) -> AppResult<String>;
}

/// Turn a page into an HTTP response: rendered HTML or a 303 redirect.
pub fn respond(renderer: &dyn Renderer, page: Page) -> AppResult<Response> {
    match page {
        Page::Render(view) => {
            let body = renderer.render(view.name, &view.data)?;
            Ok(Html(body).into_response())
        }
        Page::Redirect(url) => Ok(Redirect::to(&url).into_response()),
    }
}
