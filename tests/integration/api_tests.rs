//! Router-level tests over the in-memory store

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use catalog_server::{
    config::{AppConfig, DatabaseConfig},
    models::{
        Book, BookInstance, BookInstanceData, BookInstanceStatus, BookSummary, Genre,
        GenreDeletion, GenreWrite, RecordId,
    },
    repository::{BookInstanceStore, BookStore, GenreStore, MemoryStore, Repository},
    routes::create_router,
    AppError, AppResult, AppState,
};

fn app(store: &MemoryStore) -> Router {
    create_router(AppState::new(AppConfig::default(), Arc::new(store.clone())))
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .put_book(Book {
            id: RecordId::from("B1"),
            title: "Dune".to_string(),
            author: Some("Frank Herbert".to_string()),
            summary: String::new(),
            isbn: String::new(),
            genres: Vec::new(),
        })
        .await;
    store
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_form(app: Router, uri: &str, body: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Status, `Location` header and body text
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let store = MemoryStore::new();
    let (status, _, body) = get(app(&store), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");

    let (status, _, body) = get(app(&store), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_root_redirects_to_genres() {
    let store = MemoryStore::new();
    let (status, location, _) = get(app(&store), "/").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/catalog/genres"));
}

#[tokio::test]
async fn test_create_book_instance_with_defaults() {
    let store = seeded_store().await;
    let (status, location, _) = post_form(
        app(&store),
        "/catalog/bookinstance/create",
        "book=B1&imprint=First+Edition&status=&due_back=",
    )
    .await;

    let instances = store.book_instance_list().await.unwrap();
    assert_eq!(instances.len(), 1);
    let instance = &instances[0];
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location,
        Some(format!("/catalog/bookinstance/{}", instance.id))
    );
    assert_eq!(instance.imprint, "First Edition");
    assert_eq!(instance.status, BookInstanceStatus::Maintenance);
    assert_eq!(instance.due_back, None);

    let (status, _, body) = get(app(&store), &instance.url()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Copy: Dune</title>"));
    assert!(body.contains("First Edition"));
}

#[tokio::test]
async fn test_create_book_instance_missing_imprint() {
    let store = seeded_store().await;
    let (status, location, body) = post_form(
        app(&store),
        "/catalog/bookinstance/create",
        "book=B1&imprint=&status=Loaned&due_back=",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(location, None);
    assert!(body.contains("Imprint must be specified"));
    assert!(body.contains("Create BookInstance"));
    assert!(store.book_instance_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_due_back_is_not_reflected_as_markup() {
    let store = seeded_store().await;
    let (status, _, body) = post_form(
        app(&store),
        "/catalog/bookinstance/create",
        "book=B1&imprint=Ace&status=&due_back=%22%3E%3Cscript%3Ealert(1)%3C%2Fscript%3E",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Invalid date"));
    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;"));
    assert!(store.book_instance_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_book_instance_for_unknown_book() {
    let store = seeded_store().await;
    let (status, location, _) = post_form(
        app(&store),
        "/catalog/bookinstance/create",
        "book=B404&imprint=Ace&status=&due_back=",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(location, None);
    assert!(store.book_instance_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_genre_twice() {
    let store = MemoryStore::new();
    let (status, first, _) = post_form(app(&store), "/catalog/genre/create", "name=Fantasy").await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (status, second, _) =
        post_form(app(&store), "/catalog/genre/create", "name=+Fantasy+").await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let genres = store.genre_list().await.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(first, Some(genres[0].url()));
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_create_genre_without_name() {
    let store = MemoryStore::new();
    let (status, _, body) = post_form(app(&store), "/catalog/genre/create", "name=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Genre name required"));
    assert!(store.genre_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_genre_list_escapes_once() {
    let store = MemoryStore::new();
    post_form(app(&store), "/catalog/genre/create", "name=Sword+%26+Sorcery").await;

    let (status, _, body) = get(app(&store), "/catalog/genres").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Sword &amp; Sorcery"));
    assert!(!body.contains("&amp;amp;"));
}

#[tokio::test]
async fn test_delete_referenced_genre_is_blocked() {
    let store = seeded_store().await;
    let genre = store
        .genre_create_or_get("Sci-Fi")
        .await
        .unwrap()
        .genre()
        .clone();
    store
        .put_book(Book {
            id: RecordId::from("B2"),
            title: "Hyperion".to_string(),
            author: None,
            summary: String::new(),
            isbn: String::new(),
            genres: vec![genre.id.clone()],
        })
        .await;

    let uri = format!("{}/delete", genre.url());
    let body = format!("genreid={}", genre.id);
    let (status, location, page) = post_form(app(&store), &uri, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(location, None);
    assert!(page.contains("Hyperion"));
    assert!(page.contains("Delete the following books"));
    assert_eq!(store.genre_get(&genre.id).await.unwrap(), Some(genre));
}

#[tokio::test]
async fn test_delete_genre_uses_posted_id() {
    let store = MemoryStore::new();
    let keep = store.genre_create_or_get("Poetry").await.unwrap().genre().clone();
    let gone = store.genre_create_or_get("Western").await.unwrap().genre().clone();

    let uri = format!("{}/delete", keep.url());
    let body = format!("genreid={}", gone.id);
    let (status, location, _) = post_form(app(&store), &uri, &body).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/catalog/genres"));
    assert_eq!(store.genre_list().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn test_missing_records() {
    let store = MemoryStore::new();

    let (status, _, body) = get(app(&store), "/catalog/genre/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Genre not found"));

    let (status, _, _) = get(app(&store), "/catalog/bookinstance/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = get(app(&store), "/catalog/genre/nope/update").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, location, _) = get(app(&store), "/catalog/genre/nope/delete").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/catalog/genres"));

    let (status, location, _) = get(app(&store), "/catalog/bookinstance/nope/delete").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/catalog/bookinstances"));
}

#[tokio::test]
async fn test_update_and_delete_book_instance() {
    let store = seeded_store().await;
    let created = store
        .book_instance_create(&BookInstanceData {
            book: RecordId::from("B1"),
            imprint: "Ace".to_string(),
            status: BookInstanceStatus::Available,
            due_back: None,
        })
        .await
        .unwrap();

    let (status, _, form) = get(app(&store), &format!("{}/update", created.url())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(form.contains("Update BookInstance"));

    let (status, location, _) = post_form(
        app(&store),
        &format!("{}/update", created.url()),
        "book=B1&imprint=Ace&status=Loaned&due_back=2024-06-01",
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, Some(created.url()));

    let (_, _, list) = get(app(&store), "/catalog/bookinstances").await;
    assert!(list.contains("Loaned"));
    assert!(list.contains("Jun 1, 2024"));

    let body = format!("bookinstanceid={}", created.id);
    let (status, location, _) =
        post_form(app(&store), &format!("{}/delete", created.url()), &body).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/catalog/bookinstances"));
    assert_eq!(store.book_instance_get(&created.id).await.unwrap(), None);
}

/// Store whose every call fails
struct BrokenStore;

fn broken<T>() -> AppResult<T> {
    Err(AppError::Store("connection refused".to_string()))
}

#[async_trait]
impl BookStore for BrokenStore {
    async fn book_list_summaries(&self) -> AppResult<Vec<BookSummary>> {
        broken()
    }

    async fn book_list_by_genre(&self, _genre_id: &RecordId) -> AppResult<Vec<BookSummary>> {
        broken()
    }
}

#[async_trait]
impl GenreStore for BrokenStore {
    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        broken()
    }

    async fn genre_get(&self, _id: &RecordId) -> AppResult<Option<Genre>> {
        broken()
    }

    async fn genre_create_or_get(&self, _name: &str) -> AppResult<GenreWrite> {
        broken()
    }

    async fn genre_rename(&self, _id: &RecordId, _name: &str) -> AppResult<Option<GenreWrite>> {
        broken()
    }

    async fn genre_delete_unreferenced(&self, _id: &RecordId) -> AppResult<GenreDeletion> {
        broken()
    }
}

#[async_trait]
impl BookInstanceStore for BrokenStore {
    async fn book_instance_list(&self) -> AppResult<Vec<BookInstance>> {
        broken()
    }

    async fn book_instance_get(&self, _id: &RecordId) -> AppResult<Option<BookInstance>> {
        broken()
    }

    async fn book_instance_create(&self, _data: &BookInstanceData) -> AppResult<BookInstance> {
        broken()
    }

    async fn book_instance_replace(
        &self,
        _id: &RecordId,
        _data: &BookInstanceData,
    ) -> AppResult<Option<BookInstance>> {
        broken()
    }

    async fn book_instance_delete(&self, _id: &RecordId) -> AppResult<bool> {
        broken()
    }
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let app = create_router(AppState::new(AppConfig::default(), Arc::new(BrokenStore)));

    let (status, _, body) = get(app.clone(), "/catalog/genres").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("connection refused"));

    let (status, _, _) = get(app.clone(), "/catalog/bookinstance/create").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _, _) = get(app, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// PostgreSQL store. Run with: DATABASE_URL=postgres://... cargo test -- --ignored

async fn postgres() -> Repository {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
        ..DatabaseConfig::default()
    };
    let repository = Repository::connect(&config)
        .await
        .expect("Failed to connect to database");
    repository
        .migrate()
        .await
        .expect("Failed to run database migrations");
    repository
}

/// Name unique to this test run
fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4())
}

async fn insert_book(repository: &Repository, title: &str, genre: Option<&RecordId>) -> RecordId {
    let id = RecordId::generate();
    sqlx::query("INSERT INTO books (id, title) VALUES ($1, $2)")
        .bind(&id)
        .bind(title)
        .execute(&repository.pool)
        .await
        .unwrap();
    if let Some(genre) = genre {
        sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
            .bind(&id)
            .bind(genre)
            .execute(&repository.pool)
            .await
            .unwrap();
    }
    id
}

#[tokio::test]
#[ignore]
async fn test_postgres_genre_create_twice() {
    let repository = postgres().await;
    let name = unique("Fantasy");

    let first = repository.genre_create_or_get(&name).await.unwrap();
    let second = repository.genre_create_or_get(&name).await.unwrap();

    assert!(matches!(first, GenreWrite::Saved(_)));
    assert_eq!(second, GenreWrite::Existing(first.genre().clone()));
    let holding: Vec<Genre> = repository
        .genre_list()
        .await
        .unwrap()
        .into_iter()
        .filter(|g| g.name == name)
        .collect();
    assert_eq!(holding.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_postgres_rename_onto_taken_name() {
    let repository = postgres().await;
    let taken = repository
        .genre_create_or_get(&unique("Horror"))
        .await
        .unwrap()
        .genre()
        .clone();
    let other = repository
        .genre_create_or_get(&unique("Gothic"))
        .await
        .unwrap()
        .genre()
        .clone();

    let out = repository.genre_rename(&other.id, &taken.name).await.unwrap();
    assert_eq!(out, Some(GenreWrite::Existing(taken.clone())));
    assert_eq!(repository.genre_get(&other.id).await.unwrap(), Some(other.clone()));

    let renamed = unique("Gothic Horror");
    let out = repository.genre_rename(&other.id, &renamed).await.unwrap();
    assert_eq!(out.map(|w| w.genre().name.clone()), Some(renamed));
    assert_eq!(
        repository.genre_rename(&RecordId::generate(), "Nobody").await.unwrap(),
        None
    );
}

#[tokio::test]
#[ignore]
async fn test_postgres_guarded_delete() {
    let repository = postgres().await;
    let genre = repository
        .genre_create_or_get(&unique("Sci-Fi"))
        .await
        .unwrap()
        .genre()
        .clone();
    let book = insert_book(&repository, "Hyperion", Some(&genre.id)).await;

    assert_eq!(
        repository.genre_delete_unreferenced(&genre.id).await.unwrap(),
        GenreDeletion::Referenced
    );
    assert_eq!(repository.genre_get(&genre.id).await.unwrap(), Some(genre.clone()));

    sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(&book)
        .execute(&repository.pool)
        .await
        .unwrap();
    assert_eq!(
        repository.genre_delete_unreferenced(&genre.id).await.unwrap(),
        GenreDeletion::Deleted
    );
    assert_eq!(
        repository.genre_delete_unreferenced(&genre.id).await.unwrap(),
        GenreDeletion::Missing
    );
}

#[tokio::test]
#[ignore]
async fn test_postgres_book_instance_title_join() {
    let repository = postgres().await;
    let book = insert_book(&repository, "Dune", None).await;
    let data = BookInstanceData {
        book: book.clone(),
        imprint: "Ace, 1990".to_string(),
        status: BookInstanceStatus::Loaned,
        due_back: chrono::NaiveDate::from_ymd_opt(2024, 6, 1),
    };

    let created = repository.book_instance_create(&data).await.unwrap();
    assert_eq!(created.book_title, None);

    let fetched = repository.book_instance_get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.book_title.as_deref(), Some("Dune"));
    assert_eq!(fetched.status, BookInstanceStatus::Loaned);
    assert_eq!(fetched.due_back, data.due_back);

    let missing_book = BookInstanceData {
        book: RecordId::generate(),
        ..data.clone()
    };
    assert!(matches!(
        repository.book_instance_create(&missing_book).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        repository.book_instance_replace(&created.id, &missing_book).await,
        Err(AppError::BadRequest(_))
    ));

    assert!(repository.book_instance_delete(&created.id).await.unwrap());
    assert!(!repository.book_instance_delete(&created.id).await.unwrap());
}
