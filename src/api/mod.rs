//! HTTP surface of the Local Library catalog

pub mod catalog;
pub mod crud;
pub mod health;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    error::{AppError, ErrorPage},
    services::{
        authors::AuthorController, book_instances::BookInstanceController, books::BookController,
        genres::GenreController,
    },
    AppState,
};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(catalog::root))
        .route("/catalog", get(catalog::index))
        .route("/catalog/", get(catalog::index))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .merge(crud::routes::<BookController>())
        .merge(crud::routes::<AuthorController>())
        .merge(crud::routes::<GenreController>())
        .merge(crud::routes::<BookInstanceController>())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), error_page))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}

/// Render errors raised by handlers as the "error" page.
///
/// Handlers return [`AppError`], whose response carries an [`ErrorPage`]
/// extension. The detail is only shown in development mode.
async fn error_page(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    if page.status.is_server_error() {
        tracing::error!(status = %page.status, detail = %page.detail, "{}", page.message);
    } else {
        tracing::debug!(status = %page.status, "{}", page.message);
    }

    let detail = if state.config.is_development() {
        page.detail
    } else {
        String::new()
    };
    let data = json!({
        "title": page.message,
        "message": page.message,
        "error": {
            "status": page.status.as_u16(),
            "detail": detail,
        },
    });

    match state.renderer.render("error", &data) {
        Ok(body) => (page.status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            response
        }
    }
}
