use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response},
    ApiResponse, AppState,
};

/// Creates the router for catalog endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/upsell", get(upsell_products))
        .route("/slug/:slug", get(get_product_by_slug))
        .route("/:id/variations", get(get_product_variations))
}

/// List the full catalog
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Catalog listing"),
        (status = 502, description = "Commerce backend unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_products()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ApiResponse::success(products)))
}

/// Upsell selection shown in the cart drawer
#[utoipa::path(
    get,
    path = "/api/v1/products/upsell",
    responses((status = 200, description = "Upsell products")),
    tag = "Products"
)]
pub async fn upsell_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .upsell_products()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(ApiResponse::success(products)))
}

/// Single product by slug
#[utoipa::path(
    get,
    path = "/api/v1/products/slug/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product"),
        (status = 404, description = "No product with this slug", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .product_by_slug(&slug)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("No product with slug {}", slug)))?;
    Ok(Json(ApiResponse::success(product)))
}

/// Variations of a variable product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/variations",
    params(("id" = u64, Path, description = "Product id")),
    responses((status = 200, description = "Product variations")),
    tag = "Products"
)]
pub async fn get_product_variations(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let variations = state
        .services
        .catalog
        .variations(id)
        .await
        .map_err(map_service_error)?;
    Ok(Json(ApiResponse::success(variations)))
}
