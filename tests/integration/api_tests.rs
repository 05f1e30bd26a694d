//! HTTP integration tests: the full router over the in-memory store

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::Arc;
use tokio_test::assert_ok;
use tower::ServiceExt;
use uuid::Uuid;

use local_library::{
    api::create_router,
    config::AppConfig,
    models::{Author, Book, BookInstance, BookInstanceStatus, Entity, Genre},
    repository::Repository,
    services::Services,
    store::MemoryStore,
    views::HtmlRenderer,
    AppState,
};

struct TestApp {
    router: Router,
    repo: Repository,
}

fn app_with_mode(run_mode: &str) -> TestApp {
    let repo = Repository::new(Arc::new(MemoryStore::new()));
    let config = AppConfig {
        run_mode: run_mode.to_string(),
        ..AppConfig::default()
    };
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(Services::new(repo.clone())),
        renderer: Arc::new(HtmlRenderer::new("Local Library")),
    };
    TestApp {
        router: create_router(state),
        repo,
    }
}

fn app() -> TestApp {
    app_with_mode("development")
}

impl TestApp {
    async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post(&self, uri: &str, form: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn seed_author(&self) -> Author {
        let author = Author {
            id: Uuid::new_v4(),
            first_name: "Isaac".into(),
            family_name: "Asimov".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_ok!(self.repo.save(&author).await);
        author
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> String {
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = app();
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog");
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#""status":"healthy""#));

    let response = app.get("/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let app = app();
    let author = app.seed_author().await;
    let book = Book {
        id: Uuid::new_v4(),
        title: "Foundation".into(),
        author: author.id,
        summary: "Psychohistory".into(),
        isbn: "9780553293357".into(),
        genre: vec![],
    };
    assert_ok!(app.repo.save(&book).await);
    for status in [BookInstanceStatus::Available, BookInstanceStatus::Available, BookInstanceStatus::Loaned] {
        assert_ok!(
            app.repo
                .save(&BookInstance {
                    id: Uuid::new_v4(),
                    book: book.id,
                    imprint: "Bantam".into(),
                    status,
                    due_back: None,
                })
                .await
        );
    }

    for uri in ["/catalog", "/catalog/"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<h1>Local Library Home</h1>"));
        assert!(html.contains("<dt>book instance count</dt><dd>3</dd>"));
        assert!(html.contains("<dt>book instance available count</dt><dd>2</dd>"));
        assert!(html.contains("<dt>genre count</dt><dd>0</dd>"));
    }
}

#[tokio::test]
async fn test_create_book_then_show_it() {
    let app = app();
    let author = app.seed_author().await;
    let genre = Genre {
        id: Uuid::new_v4(),
        name: "Science Fiction".into(),
    };
    assert_ok!(app.repo.save(&genre).await);

    let form = format!(
        "title=I%2C+Robot&author={}&summary=Three+laws&isbn=0553382563&genre={}",
        author.id, genre.id
    );
    let response = app.post("/catalog/book/create", &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let url = location(&response);
    assert!(url.starts_with("/catalog/book/"));

    let response = app.get(&url).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>I, Robot</h1>"));
    assert!(html.contains("Three laws"));
    assert!(html.contains("Asimov, Isaac"));
    assert!(html.contains("Science Fiction"));
}

#[tokio::test]
async fn test_invalid_create_rerenders_the_form() {
    let app = app();
    let author = app.seed_author().await;

    let form = format!("title=&author={}&summary=S&isbn=123", author.id);
    let response = app.post("/catalog/book/create", &form).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<li>Title must not be empty.</li>"));
    assert!(html.contains(r#"name="isbn" type="text" value="123""#));

    let books: Vec<Book> = app
        .repo
        .find_all(Book::COLLECTION, &Default::default(), &Default::default())
        .await
        .unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
async fn test_unknown_ids() {
    let app = app();
    let id = Uuid::new_v4();

    let response = app.get(&format!("/catalog/book/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Book not found"));

    let response = app.get(&format!("/catalog/author/{}/update", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&format!("/catalog/genre/{}/delete", id)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/genres");

    let response = app.post(&format!("/catalog/bookinstance/{}/delete", id), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstances");
}

#[tokio::test]
async fn test_malformed_id_is_a_server_error() {
    let app = app();
    let response = app.get("/catalog/book/not-an-id").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("not-an-id"));

    let production = app_with_mode("production");
    let response = production.get("/catalog/book/not-an-id").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Database error"));
    assert!(!html.contains("not-an-id"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app();
    let response = app.get("/catalog/magazines").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("<h1>Not Found</h1>"));
}

#[tokio::test]
async fn test_genre_lifecycle() {
    let app = app();

    let response = app.post("/catalog/genre/create", "name=Poetry").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let url = location(&response);

    let response = app.post(&format!("{}/update", url), "name=Lyric+Poetry").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), url);

    let html = body_text(app.get("/catalog/genres").await).await;
    assert!(html.contains("Lyric Poetry"));

    let response = app.post(&format!("{}/delete", url), "").await;
    assert_eq!(location(&response), "/catalog/genres");
    assert_eq!(app.get(&url).await.status(), StatusCode::NOT_FOUND);
}
