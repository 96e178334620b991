use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use auth::{USER_ID_HEADER, USER_ROLE_HEADER};
use catalog::api::rest::routes;
use catalog::domain::service::{Service, ServiceConfig};
use catalog::infra::storage::migrations::Migrator;

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    let service = Arc::new(Service::new(db, ServiceConfig::default()));
    routes::router(service)
}

fn request(method: Method, uri: &str, role: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .header(USER_ROLE_HEADER, role);
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn book_payload(title: &str, author: &str, isbn: &str, price: &str) -> Value {
    json!({
        "title": title,
        "author": author,
        "isbn": isbn,
        "price": price,
    })
}

async fn create_book(app: &Router, payload: Value) -> Value {
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/books", "admin", Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test]
async fn book_crud_lifecycle() {
    let app = test_router().await;

    let created = create_book(
        &app,
        book_payload("Dune", "Frank Herbert", "9780441013593", "10.99"),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Dune");

    let response = app
        .clone()
        .oneshot(request(Method::GET, &format!("/books/{id}"), "user", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = json_body(response).await;
    assert_eq!(fetched["isbn"], "9780441013593");

    let update = book_payload("Dune Messiah", "Frank Herbert", "9780441013593", "12.50");
    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/books/{id}"),
            "admin",
            Some(update),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["title"], "Dune Messiah");
    assert_eq!(updated["id"].as_str().unwrap(), id);

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/books/{id}"),
            "admin",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(Method::GET, &format!("/books/{id}"), "user", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_isbn_is_rejected() {
    let app = test_router().await;

    create_book(
        &app,
        book_payload("Dune", "Frank Herbert", "9780441013593", "10.99"),
    )
    .await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/books",
            "admin",
            Some(book_payload(
                "Dune reprint",
                "Frank Herbert",
                "9780441013593",
                "8.00",
            )),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["code"], "isbn_conflict");
}

#[tokio::test]
async fn deleted_book_frees_its_isbn_from_listing() {
    let app = test_router().await;

    let created = create_book(
        &app,
        book_payload("Dune", "Frank Herbert", "9780441013593", "10.99"),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/books/{id}"),
            "admin",
            None,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/books", "user", None))
        .await
        .unwrap();
    let page = json_body(response).await;
    assert_eq!(page["total"], 0);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_all_books_clears_the_catalog() {
    let app = test_router().await;

    create_book(
        &app,
        book_payload("Dune", "Frank Herbert", "9780441013593", "10.99"),
    )
    .await;
    create_book(
        &app,
        book_payload("Foundation", "Isaac Asimov", "9780553293357", "9.99"),
    )
    .await;

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, "/books", "admin", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/books", "user", None))
        .await
        .unwrap();
    let page = json_body(response).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn search_intersects_fields_and_unions_values() {
    let app = test_router().await;

    create_book(
        &app,
        book_payload("Dune", "Frank Herbert", "9780441013593", "10.99"),
    )
    .await;
    create_book(
        &app,
        book_payload("Foundation", "Isaac Asimov", "9780553293357", "9.99"),
    )
    .await;
    create_book(
        &app,
        book_payload("Dune", "Brian Herbert", "9780765312921", "11.99"),
    )
    .await;

    // Two fields: conjunction narrows to the single intersection.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/books/search?title=Dune&author=Frank%20Herbert",
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["isbn"], "9780441013593");

    // One field, two values: disjunction within the field.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/books/search?author=Frank%20Herbert,Isaac%20Asimov",
            "user",
            None,
        ))
        .await
        .unwrap();
    let page = json_body(response).await;
    assert_eq!(page["total"], 2);

    // No parameters: unfiltered listing.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/books/search", "user", None))
        .await
        .unwrap();
    let page = json_body(response).await;
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn search_is_idempotent() {
    let app = test_router().await;

    create_book(
        &app,
        book_payload("Dune", "Frank Herbert", "9780441013593", "10.99"),
    )
    .await;

    let uri = "/books/search?author=Frank%20Herbert";
    let first = json_body(
        app.clone()
            .oneshot(request(Method::GET, uri, "user", None))
            .await
            .unwrap(),
    )
    .await;
    let second = json_body(
        app.clone()
            .oneshot(request(Method::GET, uri, "user", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn mutations_require_admin_role() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/books",
            "user",
            Some(book_payload("Dune", "Frank Herbert", "9780441013593", "10.99")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/books", "user", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/books")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_book_payload_is_rejected() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/books",
            "admin",
            Some(book_payload("Dune", "Frank Herbert", "123", "10.99")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/books",
            "admin",
            Some(book_payload("Dune", "Frank Herbert", "9780441013593", "0")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_links_drive_membership() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/categories",
            "admin",
            Some(json!({ "name": "Science Fiction" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let category = json_body(response).await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let mut payload = book_payload("Dune", "Frank Herbert", "9780441013593", "10.99");
    payload["category_ids"] = json!([category_id]);
    let created = create_book(&app, payload).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/categories/{category_id}/books"),
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let books = json_body(response).await;
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["id"], created["id"]);

    // Unknown category yields an empty list, not an error.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/categories/{}/books", Uuid::new_v4()),
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let books = json_body(response).await;
    assert!(books.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn book_creation_rejects_unknown_category() {
    let app = test_router().await;

    let mut payload = book_payload("Dune", "Frank Herbert", "9780441013593", "10.99");
    payload["category_ids"] = json!([Uuid::new_v4().to_string()]);

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/books", "admin", Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The failed transaction must not leave a book behind.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/books", "user", None))
        .await
        .unwrap();
    let page = json_body(response).await;
    assert_eq!(page["total"], 0);
}
