use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    errors::ApiError,
    handlers::common::validate_input,
    ApiResponse, AppState,
};

/// Creates the router for order tracking
pub fn orders_routes() -> Router<AppState> {
    Router::new().route("/track", post(track_order))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TrackOrderRequest {
    pub order_id: u64,
    #[validate(email)]
    pub email: String,
}

/// Track an order by id and billing email.
///
/// The email must match the order's billing email; a mismatch and a missing
/// order produce the same deliberately vague answer, so the endpoint cannot
/// be used to probe which order ids exist.
#[utoipa::path(
    post,
    path = "/api/v1/orders/track",
    request_body = TrackOrderRequest,
    responses((status = 200, description = "Tracking result envelope")),
    tag = "Orders"
)]
pub async fn track_order(
    State(state): State<AppState>,
    Json(payload): Json<TrackOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    info!(order_id = payload.order_id, "tracking order");

    const NOT_FOUND: &str = "Order not found with these details.";

    let response = match state.commerce.get_order(payload.order_id).await {
        Ok(order) if order.billing.email.eq_ignore_ascii_case(payload.email.trim()) => {
            ApiResponse::success(order)
        }
        Ok(_) | Err(_) => ApiResponse::error(NOT_FOUND),
    };
    Ok(Json(response))
}
