use crate::Shipments;
use crate::input::{CreateShipmentRequest, ListShipmentsQuery, LocationUpdateRequest, UpdateShipmentRequest};
use crate::model::{Shipment, ShipmentStats};
use axum::http::StatusCode;
use tport_domain::constants::TAG_SHIPMENTS;
use tport_kernel::prelude::*;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Shipment management; mount behind the admin guard.
pub fn admin_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_shipments, create_shipment))
        .routes(routes!(shipment_stats))
        .routes(routes!(get_shipment, update_shipment, delete_shipment))
        .routes(routes!(update_location))
}

#[api_handler(
    get,
    path = "/admin/api/shipments",
    params(ListShipmentsQuery),
    responses(
        (status = OK, description = "Newest first", body = ApiResponse<Vec<Shipment>>),
        (status = BAD_REQUEST, description = "Unknown status filter", body = MessageResponse),
    ),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn list_shipments(
    Slice(shipments): Slice<Shipments>,
    ApiQuery(query): ApiQuery<ListShipmentsQuery>,
) -> Result<ApiResponse<Vec<Shipment>>, ApiError> {
    Ok(ApiResponse::ok(shipments.service.list(query.status.as_deref()).await?))
}

#[api_handler(
    get,
    path = "/admin/api/shipments/stats",
    responses((status = OK, description = "Counts per status", body = ApiResponse<ShipmentStats>)),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn shipment_stats(
    Slice(shipments): Slice<Shipments>,
) -> Result<ApiResponse<ShipmentStats>, ApiError> {
    Ok(ApiResponse::ok(shipments.service.stats().await?))
}

#[api_handler(
    get,
    path = "/admin/api/shipments/{id}",
    params(("id" = String, Path, description = "Shipment id")),
    responses(
        (status = OK, body = ApiResponse<Shipment>),
        (status = NOT_FOUND, description = "Shipment not found", body = MessageResponse),
    ),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn get_shipment(
    Slice(shipments): Slice<Shipments>,
    ApiPath(id): ApiPath<String>,
) -> Result<ApiResponse<Shipment>, ApiError> {
    Ok(ApiResponse::ok(shipments.service.get(&id).await?))
}

#[api_handler(
    post,
    path = "/admin/api/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = CREATED, description = "Shipment created", body = ApiResponse<Shipment>),
        (status = BAD_REQUEST, description = "Invalid status or malformed body", body = MessageResponse),
    ),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn create_shipment(
    Slice(shipments): Slice<Shipments>,
    ApiJson(request): ApiJson<CreateShipmentRequest>,
) -> Result<(StatusCode, ApiResponse<Shipment>), ApiError> {
    let shipment = shipments.service.create(request).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(shipment).with_message("Shipment created successfully")))
}

#[api_handler(
    put,
    path = "/admin/api/shipments/{id}",
    params(("id" = String, Path, description = "Shipment id")),
    request_body = UpdateShipmentRequest,
    responses(
        (status = OK, body = ApiResponse<Shipment>),
        (status = BAD_REQUEST, description = "Unknown status", body = MessageResponse),
        (status = NOT_FOUND, description = "Shipment not found", body = MessageResponse),
        (status = CONFLICT, description = "Status is terminal", body = MessageResponse),
    ),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn update_shipment(
    Slice(shipments): Slice<Shipments>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateShipmentRequest>,
) -> Result<ApiResponse<Shipment>, ApiError> {
    let shipment = shipments.service.update(&id, request).await?;
    Ok(ApiResponse::ok(shipment).with_message("Shipment updated successfully"))
}

#[api_handler(
    post,
    path = "/admin/api/shipments/{id}/location",
    params(("id" = String, Path, description = "Shipment id")),
    request_body = LocationUpdateRequest,
    responses(
        (status = OK, body = ApiResponse<Shipment>),
        (status = BAD_REQUEST, description = "lat and lng are required numbers", body = MessageResponse),
        (status = NOT_FOUND, description = "Shipment not found", body = MessageResponse),
    ),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn update_location(
    Slice(shipments): Slice<Shipments>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<LocationUpdateRequest>,
) -> Result<ApiResponse<Shipment>, ApiError> {
    Ok(ApiResponse::ok(shipments.service.update_location(&id, &request).await?))
}

#[api_handler(
    delete,
    path = "/admin/api/shipments/{id}",
    params(("id" = String, Path, description = "Shipment id")),
    responses(
        (status = OK, description = "Shipment deleted", body = MessageResponse),
        (status = NOT_FOUND, description = "Shipment not found", body = MessageResponse),
    ),
    tag = TAG_SHIPMENTS,
)]
pub(crate) async fn delete_shipment(
    Slice(shipments): Slice<Shipments>,
    ApiPath(id): ApiPath<String>,
) -> Result<ApiResponse<()>, ApiError> {
    shipments.service.delete(&id).await?;
    Ok(ApiResponse::success("Shipment deleted successfully"))
}
