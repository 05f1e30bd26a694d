//! Routes and handlers shared by every catalog entity

use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Form, Router,
};

use crate::{
    error::AppResult,
    services::{
        authors::AuthorController, book_instances::BookInstanceController, books::BookController,
        genres::GenreController, CrudController, Services,
    },
    store::parse_id,
    validation::FormData,
    AppState,
};

/// A controller mounted under `/catalog`
pub trait Routed: CrudController + 'static {
    /// Path segment for a single entity (`/catalog/book/:id`)
    const SINGULAR: &'static str;
    /// Path segment of the list page (`/catalog/books`)
    const PLURAL: &'static str;

    fn select(services: &Services) -> &Self;
}

impl Routed for BookController {
    const SINGULAR: &'static str = "book";
    const PLURAL: &'static str = "books";

    fn select(services: &Services) -> &Self {
        &services.books
    }
}

impl Routed for AuthorController {
    const SINGULAR: &'static str = "author";
    const PLURAL: &'static str = "authors";

    fn select(services: &Services) -> &Self {
        &services.authors
    }
}

impl Routed for GenreController {
    const SINGULAR: &'static str = "genre";
    const PLURAL: &'static str = "genres";

    fn select(services: &Services) -> &Self {
        &services.genres
    }
}

impl Routed for BookInstanceController {
    const SINGULAR: &'static str = "bookinstance";
    const PLURAL: &'static str = "bookinstances";

    fn select(services: &Services) -> &Self {
        &services.book_instances
    }
}

/// The eight CRUD routes of one entity
pub fn routes<C: Routed>() -> Router<AppState> {
    let one = format!("/catalog/{}", C::SINGULAR);
    Router::new()
        .route(&format!("/catalog/{}", C::PLURAL), get(list::<C>))
        .route(&format!("{}/create", one), get(create_get::<C>).post(create_post::<C>))
        .route(&format!("{}/:id", one), get(detail::<C>))
        .route(&format!("{}/:id/delete", one), get(delete_get::<C>).post(delete_post::<C>))
        .route(&format!("{}/:id/update", one), get(update_get::<C>).post(update_post::<C>))
}

async fn list<C: Routed>(State(state): State<AppState>) -> AppResult<Response> {
    let page = C::select(&state.services).list().await?;
    state.respond(page)
}

async fn detail<C: Routed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let page = C::select(&state.services).detail(id).await?;
    state.respond(page)
}

async fn create_get<C: Routed>(State(state): State<AppState>) -> AppResult<Response> {
    let page = C::select(&state.services).create_get().await?;
    state.respond(page)
}

async fn create_post<C: Routed>(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let page = C::select(&state.services).create_post(FormData::from_pairs(pairs)).await?;
    state.respond(page)
}

async fn delete_get<C: Routed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let page = C::select(&state.services).delete_get(id).await?;
    state.respond(page)
}

async fn delete_post<C: Routed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let page = C::select(&state.services).delete_post(id).await?;
    state.respond(page)
}

async fn update_get<C: Routed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let page = C::select(&state.services).update_get(id).await?;
    state.respond(page)
}

async fn update_post<C: Routed>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let page = C::select(&state.services).update_post(id, FormData::from_pairs(pairs)).await?;
    state.respond(page)
}
