use std::str::FromStr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use auth::{USER_ID_HEADER, USER_ROLE_HEADER};
use catalog::contract::model::NewBook;
use catalog::domain::service::{Service as CatalogService, ServiceConfig};
use catalog::gateways::local::CatalogLocalClient;
use catalog::infra::storage::migrations::Migrator as CatalogMigrator;
use storefront::api::rest::routes;
use storefront::domain::cart::CartService;
use storefront::domain::orders::OrderService;
use storefront::infra::storage::migrations::Migrator as StorefrontMigrator;

struct TestApp {
    router: Router,
    catalog: Arc<CatalogService>,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    CatalogMigrator::up(&db, None).await.expect("catalog schema");
    StorefrontMigrator::up(&db, None)
        .await
        .expect("storefront schema");

    let catalog = Arc::new(CatalogService::new(db.clone(), ServiceConfig::default()));
    let catalog_client = Arc::new(CatalogLocalClient::new(catalog.clone()));
    let carts = Arc::new(CartService::new(db.clone(), catalog_client));
    let orders = Arc::new(OrderService::new(db));

    TestApp {
        router: routes::router(carts, orders),
        catalog,
    }
}

async fn seed_book(app: &TestApp, title: &str, isbn: &str, price: Decimal) -> Uuid {
    let book = app
        .catalog
        .create_book(NewBook {
            title: title.to_string(),
            author: "Test Author".to_string(),
            isbn: isbn.to_string(),
            price,
            description: None,
            cover_image: None,
            category_ids: vec![],
        })
        .await
        .expect("seed book");
    book.id
}

fn request(method: Method, uri: &str, user: Uuid, role: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user.to_string())
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

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).unwrap()
}

async fn add_to_cart(app: &TestApp, user: Uuid, book_id: Uuid, quantity: i32) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::POST,
            "/cart",
            user,
            "user",
            Some(json!({ "book_id": book_id, "quantity": quantity })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

async fn checkout(app: &TestApp, user: Uuid) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::POST,
            "/orders",
            user,
            "user",
            Some(json!({ "shipping_address": "1 Main St" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test]
async fn repeat_add_accumulates_into_one_line() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1099, 2)).await;

    add_to_cart(&app, user, book, 3).await;
    let cart = add_to_cart(&app, user, book, 2).await;

    let lines = cart["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);
}

#[tokio::test]
async fn update_overwrites_quantity() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1099, 2)).await;

    let cart = add_to_cart(&app, user, book, 3).await;
    let line_id = cart["lines"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/cart/items/{line_id}"),
            user,
            "user",
            Some(json!({ "quantity": 7 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cart = json_body(response).await;
    assert_eq!(cart["lines"][0]["quantity"], 7);
}

#[tokio::test]
async fn cart_line_removal() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1099, 2)).await;

    let cart = add_to_cart(&app, user, book, 1).await;
    let line_id = cart["lines"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/cart/items/{line_id}"),
            user,
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Removing again fails, the line is gone.
    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/cart/items/{line_id}"),
            user,
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_cart_and_unknown_book_are_not_found() {
    let app = test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/cart", user, "user", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::POST,
            "/cart",
            user,
            "user",
            Some(json!({ "book_id": Uuid::new_v4(), "quantity": 1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1099, 2)).await;

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::POST,
            "/cart",
            user,
            "user",
            Some(json!({ "book_id": book, "quantity": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_totals_the_worked_example() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book_a = seed_book(&app, "Book A", "9780000000001", Decimal::new(1000, 2)).await;
    let book_b = seed_book(&app, "Book B", "9780000000002", Decimal::new(500, 2)).await;

    add_to_cart(&app, user, book_a, 2).await;
    add_to_cart(&app, user, book_b, 1).await;

    let order = checkout(&app, user).await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["lines"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&order["total"]), Decimal::new(2500, 2));

    // The cart is consumed by checkout.
    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/cart", user, "user", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_order_accumulates_second_checkout() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book_a = seed_book(&app, "Book A", "9780000000001", Decimal::new(1000, 2)).await;
    let book_b = seed_book(&app, "Book B", "9780000000002", Decimal::new(500, 2)).await;

    add_to_cart(&app, user, book_a, 1).await;
    let first = checkout(&app, user).await;

    add_to_cart(&app, user, book_b, 2).await;
    let second = checkout(&app, user).await;

    // Same order row, lines appended, total grown by the new lines' sum.
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["lines"].as_array().unwrap().len(), 2);
    assert_eq!(
        decimal(&second["total"]),
        decimal(&first["total"]) + Decimal::new(1000, 2)
    );

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/orders", user, "user", None))
        .await
        .unwrap();
    let orders = json_body(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_pending_latest_order_forces_a_new_one() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1000, 2)).await;

    add_to_cart(&app, user, book, 1).await;
    let first = checkout(&app, user).await;
    let first_id = first["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/orders/{first_id}"),
            admin,
            "admin",
            Some(json!({ "status": "shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    add_to_cart(&app, user, book, 1).await;
    let second = checkout(&app, user).await;
    assert_ne!(second["id"], first["id"]);
    assert_eq!(second["status"], "pending");

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/orders", user, "user", None))
        .await
        .unwrap();
    let orders = json_body(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_cart_checkout_yields_zero_total() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1000, 2)).await;

    // Emptying the cart leaves it alive with no lines.
    let cart = add_to_cart(&app, user, book, 1).await;
    let line_id = cart["lines"][0]["id"].as_str().unwrap().to_string();
    app.router
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/cart/items/{line_id}"),
            user,
            "user",
            None,
        ))
        .await
        .unwrap();

    let order = checkout(&app, user).await;
    assert!(order["lines"].as_array().unwrap().is_empty());
    assert_eq!(decimal(&order["total"]), Decimal::ZERO);
}

#[tokio::test]
async fn order_line_snapshots_checkout_time_price() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1000, 2)).await;

    add_to_cart(&app, user, book, 1).await;
    let order = checkout(&app, user).await;
    assert_eq!(decimal(&order["lines"][0]["unit_price"]), Decimal::new(1000, 2));

    // A later price change must not touch the snapshot.
    app.catalog
        .update_book(
            book,
            NewBook {
                title: "Dune".to_string(),
                author: "Test Author".to_string(),
                isbn: "9780441013593".to_string(),
                price: Decimal::new(9900, 2),
                description: None,
                cover_image: None,
                category_ids: vec![],
            },
        )
        .await
        .unwrap();

    let order_id = order["id"].as_str().unwrap().to_string();
    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/orders/{order_id}/items"),
            user,
            "user",
            None,
        ))
        .await
        .unwrap();
    let lines = json_body(response).await;
    assert_eq!(decimal(&lines[0]["unit_price"]), Decimal::new(1000, 2));
}

#[tokio::test]
async fn foreign_orders_are_invisible() {
    let app = test_app().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1000, 2)).await;

    add_to_cart(&app, owner, book, 1).await;
    let order = checkout(&app, owner).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let line_id = order["lines"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/orders/{order_id}/items"),
            stranger,
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/orders/{order_id}/items/{line_id}"),
            stranger,
            "user",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/orders", stranger, "user", None))
        .await
        .unwrap();
    let orders = json_body(response).await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn status_updates_are_admin_only_and_validated() {
    let app = test_app().await;
    let user = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let book = seed_book(&app, "Dune", "9780441013593", Decimal::new(1000, 2)).await;

    add_to_cart(&app, user, book, 1).await;
    let order = checkout(&app, user).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/orders/{order_id}"),
            user,
            "user",
            Some(json!({ "status": "shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/orders/{order_id}"),
            admin,
            "admin",
            Some(json!({ "status": "teleported" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Transitions are unconstrained: cancelled may follow delivered.
    for status in ["delivered", "cancelled", "pending"] {
        let response = app
            .router
            .clone()
            .oneshot(request(
                Method::PATCH,
                &format!("/orders/{order_id}"),
                admin,
                "admin",
                Some(json!({ "status": status })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], status);
    }

    let response = app
        .router
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/orders/{}", Uuid::new_v4()),
            admin,
            "admin",
            Some(json!({ "status": "shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
