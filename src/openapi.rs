//! OpenAPI documentation for the public API surface.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        description = "Headless storefront backend: catalog proxy, cart pricing, checkout orchestration, and payment callback verification"
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::upsell_products,
        crate::handlers::products::get_product_by_slug,
        crate::handlers::products::get_product_variations,
        crate::handlers::cart::quote_cart,
        crate::handlers::checkout::begin_checkout,
        crate::handlers::checkout::payment_callback,
        crate::handlers::auth::social_login,
        crate::handlers::auth::send_otp,
        crate::handlers::auth::verify_otp,
        crate::handlers::auth::logout,
        crate::handlers::orders::track_order,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::models::Cart,
        crate::models::CartLine,
        crate::models::Product,
        crate::models::CustomerRecord,
        crate::models::OrderRecord,
        crate::services::pricing::PricingResult,
        crate::services::pricing::CouponOutcome,
        crate::services::checkout::CheckoutRequest,
        crate::services::drafts::AddressInput,
        crate::models::PaymentMethod,
        crate::handlers::cart::QuoteRequest,
        crate::handlers::auth::SocialLoginRequest,
        crate::handlers::auth::SendOtpRequest,
        crate::handlers::auth::VerifyOtpRequest,
        crate::handlers::orders::TrackOrderRequest,
    )),
    tags(
        (name = "Products", description = "Catalog proxying"),
        (name = "Cart", description = "Cart pricing"),
        (name = "Checkout", description = "Checkout and payment callbacks"),
        (name = "Auth", description = "Customer login flows"),
        (name = "Orders", description = "Order tracking")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at /swagger-ui.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_checkout_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["paths"].get("/api/v1/checkout").is_some());
        assert!(json["paths"].get("/api/v1/payments/callback").is_some());
        assert!(json["paths"].get("/api/v1/products").is_some());
    }
}
