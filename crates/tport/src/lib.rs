//! Facade crate for the tracking service features and shared modules.
//! Re-exports domain/kernel primitives, aggregates slice initialisation and composes the feature
//! routers. Keep this crate thin: it composes other crates, it does not implement business logic.

use axum::middleware::from_fn_with_state;
use tport_database::{Database, Migration};
pub use tport_domain as domain;
use tport_domain::config::ApiConfig;
use tport_domain::registry::InitializedSlice;
use tport_event_bus::EventBus;
pub use tport_kernel as kernel;
use tport_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;

pub mod server {
    pub mod router {
        pub use tport_kernel::server::{route_not_found, system_router};
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use tport_identity as identity;
    pub use tport_notifications as notifications;
    pub use tport_shipments as shipments;

    pub const ENABLED: &[&str] = &["identity", "shipments", "notifications"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Schema migrations of every slice, in the order they must run.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    features::shipments::MIGRATIONS.to_vec()
}

/// Initialize all feature slices. Spawns the notification worker, so call it inside a runtime.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let mut slices = Vec::new();

    // Identity
    slices.push(features::identity::init(&config.security.auth)?);

    // Shipments
    slices.push(features::shipments::init(database.clone(), events.clone()));

    // Notifications (consumes shipment events)
    slices.push(features::notifications::init(config, events)?);

    Ok(slices)
}

/// Login, logout and session check.
#[must_use]
pub fn auth_routes() -> OpenApiRouter<ApiState> {
    features::identity::router()
}

/// Shipment management and the test-email route, all behind the admin session guard.
#[must_use]
pub fn admin_routes(state: &ApiState) -> OpenApiRouter<ApiState> {
    features::shipments::admin_router()
        .merge(features::notifications::router())
        .route_layer(from_fn_with_state(state.clone(), features::identity::require_admin))
}

/// Unauthenticated tracking lookup.
#[must_use]
pub fn public_routes() -> OpenApiRouter<ApiState> {
    features::shipments::public_router()
}
