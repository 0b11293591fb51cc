use crate::Shipments;
use crate::model::TrackingView;
use tport_domain::constants::TAG_TRACKING;
use tport_kernel::prelude::*;
use tracing::instrument;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Unauthenticated lookup by tracking id.
pub fn public_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(track_shipment))
}

#[api_handler(
    get,
    path = "/track/{trackingId}",
    params(("trackingId" = String, Path, description = "Tracking id, case-insensitive")),
    responses(
        (status = OK, body = ApiResponse<TrackingView>),
        (status = NOT_FOUND, description = "Tracking ID not found", body = MessageResponse),
    ),
    tag = TAG_TRACKING,
)]
#[instrument(skip(shipments))]
pub(crate) async fn track_shipment(
    Slice(shipments): Slice<Shipments>,
    ApiPath(tracking_id): ApiPath<String>,
) -> Result<ApiResponse<TrackingView>, ApiError> {
    Ok(ApiResponse::ok(shipments.service.track(&tracking_id).await?))
}
