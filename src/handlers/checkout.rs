use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    errors::{ApiError, ServiceError},
    handlers::common::{created_response, map_service_error, validate_input},
    services::checkout::{CallbackForm, CheckoutRequest},
    ApiResponse, AppState,
};

/// Creates the router for checkout
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/", post(begin_checkout))
}

/// Creates the router for payment gateway callbacks
pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/callback", post(payment_callback))
}

/// Start a checkout attempt.
///
/// For gateway payments the response carries the parameters the hosted
/// payment widget needs; for cash on delivery the order is placed outright.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Checkout started"),
        (status = 400, description = "Missing address fields or empty cart", body = crate::errors::ErrorResponse),
        (status = 502, description = "Commerce backend or gateway failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub async fn begin_checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload.billing)?;

    let outcome = state
        .services
        .checkout
        .begin(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ApiResponse::success(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub order_id: Option<u64>,
}

/// Payment gateway callback.
///
/// The gateway posts form-encoded payment details here when the buyer
/// finishes (or abandons) the hosted widget, with the order id carried on
/// the query string. The buyer's browser follows the 303 redirect back to
/// the storefront checkout page, so this endpoint never answers with JSON.
#[utoipa::path(
    post,
    path = "/api/v1/payments/callback",
    params(("order_id" = Option<u64>, Query, description = "Commerce backend order id")),
    responses((status = 303, description = "Redirect to the storefront checkout result page")),
    tag = "Checkout"
)]
pub async fn payment_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    Form(form): Form<CallbackForm>,
) -> Redirect {
    match state
        .services
        .checkout
        .handle_callback(query.order_id, form)
        .await
    {
        Ok(order_id) => {
            info!(order_id, "payment callback completed; redirecting to success view");
            Redirect::to(&state.config.checkout_redirect(&format!(
                "success=true&order_id={}",
                order_id
            )))
        }
        Err(err) => {
            let code = match err {
                ServiceError::MissingFields(_) => "missing_details",
                ServiceError::Signature(_) => "invalid_signature",
                _ => "server_error",
            };
            Redirect::to(&state.config.checkout_redirect(&format!("error={}", code)))
        }
    }
}
