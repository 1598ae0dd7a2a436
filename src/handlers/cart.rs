use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    errors::ApiError,
    models::CartLine,
    services::pricing,
    ApiResponse, AppState,
};

/// Creates the router for cart pricing
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/quote", post(quote_cart))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub cart: Vec<CartLine>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Price a cart: subtotal, shipping fee, discounts, and grand total.
///
/// Recomputed on every cart mutation; an unknown coupon code is flagged in
/// the result, never rejected.
#[utoipa::path(
    post,
    path = "/api/v1/cart/quote",
    request_body = QuoteRequest,
    responses((status = 200, description = "Derived pricing for the cart")),
    tag = "Cart"
)]
pub async fn quote_cart(
    State(_state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = pricing::quote(&payload.cart, payload.coupon_code.as_deref());
    Ok(Json(ApiResponse::success(result)))
}
