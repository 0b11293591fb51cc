use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use tport::domain::config::ApiConfig;
use tport_server::Server;

const PASSWORD: &str = "server-test-password";

async fn app_with(configure: impl FnOnce(&mut ApiConfig)) -> Router {
    let mut config = ApiConfig::default();
    config.security.auth.admin_password = PASSWORD.to_owned();
    configure(&mut config);
    let server = Server::builder().config(config).build().await.unwrap();
    tport_server::app(server.state().clone())
}

async fn app() -> Router {
    app_with(|_| {}).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router) -> String {
    let body = json!({"username": "Transportify-admin", "password": PASSWORD});
    let (status, _, body) = send(app, post_json("/admin/login", &body, None)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_carries_security_headers() {
    let app = app().await;
    let (status, headers, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
}

#[tokio::test]
async fn unknown_routes_use_the_envelope() {
    let app = app().await;
    let (status, headers, body) = send(&app, Request::get("/nowhere").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Route not found"}));
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn admin_api_requires_a_session() {
    let app = app().await;
    let (status, _, body) =
        send(&app, Request::get("/admin/api/shipments").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, _, _) = send(&app, post_json("/admin/api/notifications/test", &json!({"to": "a@b.c"}), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_creates_and_public_tracks() {
    let app = app().await;
    let token = login(&app).await;

    let (status, _, created) = send(
        &app,
        post_json("/admin/api/shipments", &json!({"origin": {"city": "Lagos"}}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tracking_id = created["data"]["trackingID"].as_str().unwrap();

    let request = Request::get(format!("/track/{tracking_id}"))
        .header(header::ORIGIN, "https://anywhere.example")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trackingHistory"][0]["location"], "Lagos");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn admin_cors_only_allows_configured_origins() {
    let app = app_with(|config| config.security.cors.allowed_origins = vec!["https://admin.example".to_owned()]).await;
    let preflight = |origin: &str| {
        Request::options("/admin/check-auth")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let (_, headers, _) = send(&app, preflight("https://admin.example")).await;
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://admin.example");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let (_, headers, _) = send(&app, preflight("https://evil.example")).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn clients_are_rate_limited() {
    let app = app_with(|config| config.security.rate_limit.max_requests = 2).await;
    let request = || {
        Request::get("/health").header("x-forwarded-for", "198.51.100.7").body(Body::empty()).unwrap()
    };

    assert_eq!(send(&app, request()).await.0, StatusCode::OK);
    assert_eq!(send(&app, request()).await.0, StatusCode::OK);
    let (status, _, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"success": false, "message": "Too many requests"}));

    let other = Request::get("/health").header("x-forwarded-for", "198.51.100.8").body(Body::empty()).unwrap();
    assert_eq!(send(&app, other).await.0, StatusCode::OK);
}

#[tokio::test]
async fn api_reference_is_served() {
    let app = app().await;
    let response = app.oneshot(Request::get("/api").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
