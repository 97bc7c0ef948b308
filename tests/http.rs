use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use storefront::api::{self, AppState};
use storefront::{Config, EventPublisher, MemoryStore};
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), EventPublisher::local_only(), Config::default());
    api::router(state)
}

fn request(method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie { builder = builder.header(header::COOKIE, c); }
    match body {
        Some(b) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(b.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let cookie = res.headers().get(header::SET_COOKIE).map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, cookie, body)
}

/// Logs in and returns the `name=value` pair to send back.
async fn login(app: &Router) -> String {
    let (status, cookie, _) = send(app, request(Method::POST, "/api/v1/admin/login", Some(json!({"pin": "1234"})), None)).await;
    assert_eq!(status, StatusCode::OK);
    cookie.unwrap().split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = send(&app(), request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_admin_requires_session() {
    let app = app();
    let (status, _, body) = send(&app, request(Method::GET, "/api/v1/admin/dashboard", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(&app, request(Method::GET, "/api/v1/admin/dashboard", None, Some("admin_session=true"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_pin_rejected() {
    let (status, cookie, body) = send(&app(), request(Method::POST, "/api/v1/admin/login", Some(json!({"pin": "0000"})), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_login_cookie_opens_back_office() {
    let app = app();
    let (_, raw_cookie, _) = send(&app, request(Method::POST, "/api/v1/admin/login", Some(json!({"pin": "1234"})), None)).await;
    let raw_cookie = raw_cookie.unwrap();
    assert!(raw_cookie.contains("HttpOnly"));
    assert!(!raw_cookie.contains("Secure"));

    let cookie = login(&app).await;
    let (status, _, body) = send(&app, request(Method::GET, "/api/v1/admin/dashboard", None, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], json!([]));

    let (_, cleared, _) = send(&app, request(Method::POST, "/api/v1/admin/logout", None, Some(&cookie))).await;
    assert!(cleared.unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_catalog_and_checkout_flow() {
    let app = app();
    let cookie = login(&app).await;

    let (status, _, category) =
        send(&app, request(Method::POST, "/api/v1/admin/categories", Some(json!({"name": "Bebidas"})), Some(&cookie))).await;
    assert_eq!(status, StatusCode::CREATED);

    let product = json!({
        "name": "Cerveja Lata",
        "categoryId": category["id"],
        "variants": [{"name": "Brahma (350ml)", "price": "3,89", "stock": 5}]
    });
    let (status, _, created) = send(&app, request(Method::POST, "/api/v1/admin/products", Some(product), Some(&cookie))).await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = created["productId"].as_str().unwrap().to_string();

    let (status, _, front) = send(&app, request(Method::GET, "/api/v1/storefront", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = &front["sections"][0]["products"][0];
    assert_eq!(listed["id"], product_id.as_str());
    let variant_id = listed["variants"][0]["id"].clone();

    let order = json!({
        "customer": {"name": "Maria Silva", "phone": "(83) 99418-9808", "address": "Rua das Flores, 10", "paymentMethod": "Pix"},
        "items": [{
            "productId": product_id, "variantId": variant_id, "productName": "Cerveja Lata",
            "variantName": "Brahma (350ml)", "price": 3.89, "quantity": 2
        }],
        "total": "0.01"
    });
    let (status, _, placed) = send(&app, request(Method::POST, "/api/v1/orders", Some(order.clone()), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["success"], true);
    assert_eq!(placed["total"], "7.78");
    assert!(placed["whatsappLink"].as_str().unwrap().starts_with("https://wa.me/5583994189808?text="));
    assert!(placed["message"].as_str().unwrap().contains("*Total: R$ 7,78*"));

    let mut oversell = order;
    oversell["items"][0]["quantity"] = json!(4);
    let (status, _, body) = send(&app, request(Method::POST, "/api/v1/orders", Some(oversell), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "insufficient_stock");

    let uri = format!("/api/v1/admin/orders/{}/status", placed["orderId"]);
    let (status, _, _) = send(&app, request(Method::PUT, &uri, Some(json!({"status": "Delivered"})), Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, dashboard) = send(&app, request(Method::GET, "/api/v1/admin/dashboard", None, Some(&cookie))).await;
    assert_eq!(dashboard["delivered"], 1);
    assert_eq!(dashboard["orders"][0]["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_invalid_checkout_is_bad_request() {
    let app = app();
    let order = json!({
        "customer": {"name": "Al", "phone": "1", "address": "x", "paymentMethod": "Pix"},
        "items": []
    });
    let (status, _, body) = send(&app, request(Method::POST, "/api/v1/orders", Some(order), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "validation");

    let (status, _, _) = send(&app, request(Method::POST, "/api/v1/orders", Some(json!({"items": "nope"})), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = app();
    let cookie = login(&app).await;
    let (status, _, body) = send(&app, request(Method::GET, "/api/v1/admin/orders/404", None, Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
