use axum::Router;
use axum::middleware::from_fn_with_state;
use tport::kernel::prelude::ApiState;
use tport::kernel::security::{RateLimiter, rate_limit};
use tport::kernel::server::{admin_cors, public_cors, route_not_found, security_headers, system_router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(title = "Transportify API", description = "Shipment tracking service"),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Auth", description = "Admin session"),
        (name = "Shipments", description = "Shipment management (admin)"),
        (name = "Tracking", description = "Public tracking lookup"),
        (name = "Notifications", description = "Email notifications (admin)"),
    )
)]
struct ApiDoc;

/// Assembles the full application: admin routes with credentialed CORS, the public lookup with
/// open CORS, the `OpenAPI` UI at `/api`, then security headers, rate limiting and tracing.
pub fn init(state: ApiState) -> Router {
    let config = state.config.clone();
    let limiter = RateLimiter::from_config(&config.security.rate_limit);

    let admin = OpenApiRouter::new()
        .merge(system_router())
        .merge(tport::auth_routes())
        .merge(tport::admin_routes(&state))
        .layer(admin_cors(&config.security.cors));
    let public = tport::public_routes().layer(public_cors());

    // Separate the OpenAPI routes and the API documentation object
    let (routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(admin)
        .merge(public)
        .with_state(state)
        .split_for_parts();

    let app = Router::new()
        .merge(routes)
        .merge(Scalar::with_url("/api", api_doc))
        .fallback(route_not_found);

    security_headers(app)
        .layer(from_fn_with_state(limiter, rate_limit))
        .layer(TraceLayer::new_for_http())
}
