//! Home page endpoints

use axum::{
    extract::State,
    response::{Redirect, Response},
};

use crate::{error::AppResult, AppState};

/// Dashboard with the catalog counts
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.catalog.index().await?;
    state.respond(page)
}

/// `/` has no page of its own
pub async fn root() -> Redirect {
    Redirect::to("/catalog")
}
