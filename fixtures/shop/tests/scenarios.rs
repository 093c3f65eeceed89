//! Drives the registration code `build.rs` generated for this crate through
//! the router.

use bytes::Bytes;
use routegen::prelude::*;
use shop_fixture::app;

fn request(method: Method, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

fn authorized(method: Method, path: &str) -> Request {
    let mut req = request(method, path);
    req.headers_mut()
        .insert(http::header::AUTHORIZATION, "Bearer t".parse().unwrap());
    req
}

// ── Registration ────────────────────────────────────────────────────────────

#[test]
fn test_registration_order_and_metadata() {
    let routes = app().routes();

    let table: Vec<(&str, &str, bool)> = routes
        .iter()
        .map(|info| (info.method.as_str(), info.path.as_str(), info.requires_authorization))
        .collect();
    assert_eq!(
        table,
        [
            ("GET", "products/{id}", false),
            ("GET", "products/named", false),
            ("GET", "member/products", true),
            ("POST", "member/products/buy", true),
            ("DELETE", "products/{id}", false),
            ("GET", "health", false),
        ]
    );
    assert_eq!(routes[4].name.as_deref(), Some("audited:products/{id}"));
    assert_eq!(routes[5].name.as_deref(), Some("audited:health"));
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_static_handler_registration() {
    let response = app().handle(request(Method::GET, "/products/17")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), &Bytes::from_static(b"product 17"));
}

#[tokio::test]
async fn test_shared_instance_with_configurators() {
    let app = app();

    let response = app.handle(request(Method::GET, "/member/products")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = app.handle(request(Method::POST, "/member/products/buy")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .handle(authorized(Method::GET, "/member/products"))
        .await;
    assert_eq!(response.body(), &Bytes::from_static(b"member products"));
    let response = app
        .handle(authorized(Method::POST, "/member/products/buy"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_named_route() {
    let app = app();
    let named = app.route_named("NamedProducts").unwrap();
    assert_eq!(named.path(), "products/named");

    let response = app.handle(request(Method::GET, "/products/named")).await;
    assert_eq!(response.body(), &Bytes::from_static(b"named"));
}

// ── Edge cases ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_explicit_configurator_wins_over_bound() {
    let response = app().handle(request(Method::DELETE, "/products/3")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_free_function_handler() {
    let response = app().handle(request(Method::GET, "/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), &Bytes::from_static(b"ok"));
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app().handle(request(Method::GET, "/orders")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
