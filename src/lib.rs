//! Storefront API Library
//!
//! Backend for a headless oils storefront: proxies the commerce backend's
//! catalog/customers/orders, prices carts, orchestrates checkout against a
//! hosted payment gateway, and verifies the gateway's signed callbacks.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod clients;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use clients::CommerceClient;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub commerce: Arc<CommerceClient>,
    pub services: handlers::AppServices,
}

/// Uniform response envelope.
///
/// Every orchestration-boundary failure is converted into
/// `{success: false, error}`; no internal error type crosses into the
/// storefront frontend.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Catalog
        .nest("/products", handlers::products::products_routes())
        // Cart pricing
        .nest("/cart", handlers::cart::cart_routes())
        // Checkout and gateway callback
        .nest("/checkout", handlers::checkout::checkout_routes())
        .nest("/payments", handlers::checkout::payment_routes())
        // Login flows
        .nest("/auth", handlers::auth::auth_routes())
        // Order tracking
        .nest("/orders", handlers::orders::orders_routes())
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "storefront-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    // Check the OTP store's backing cache; the commerce backend and gateway
    // are deliberately not probed on every health check.
    let otp_status = if state.services.otp.ping().await {
        "healthy"
    } else {
        "unhealthy"
    };

    let health_data = json!({
        "status": if otp_status == "healthy" { "healthy" } else { "degraded" },
        "checks": {
            "otp_store": otp_status,
            "otp_backend": state.services.otp.backend_name(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error() {
        let response = ApiResponse::success("ok");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "ok");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_envelope_omits_data() {
        let response = ApiResponse::<()>::error("oops");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "oops");
        assert!(json.get("data").is_none());
    }
}
