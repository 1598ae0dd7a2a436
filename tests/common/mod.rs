//! Shared test harness: the full router wired against mock external services.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use storefront_api::{
    clients::{CommerceClient, GatewayClient},
    config::{AppConfig, CommerceConfig, GatewayConfig, OtpConfig},
    handlers::AppServices,
    services::OtpStore,
    AppState,
};

pub const GATEWAY_SECRET: &str = "gw_secret_abcdef012345";
pub const STOREFRONT_CHECKOUT: &str = "https://shop.example.com/checkout";

pub struct TestApp {
    pub router: Router,
    pub commerce: MockServer,
    pub gateway: MockServer,
    pub otp: Arc<OtpStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        let commerce = MockServer::start().await;
        let gateway = MockServer::start().await;

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            public_base_url: "https://api.shop.example.com".into(),
            storefront_checkout_url: STOREFRONT_CHECKOUT.into(),
            guest_email_domain: "guest.example.com".into(),
            upsell_limit: 10,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            commerce: CommerceConfig {
                base_url: commerce.uri(),
                consumer_key: "ck_test".into(),
                consumer_secret: "cs_test_0123456789".into(),
                timeout_secs: 5,
            },
            gateway: GatewayConfig {
                base_url: gateway.uri(),
                key_id: "key_test_1234".into(),
                key_secret: GATEWAY_SECRET.into(),
                currency: "INR".into(),
                timeout_secs: 5,
            },
            otp: OtpConfig::default(),
        };

        let commerce_client = Arc::new(CommerceClient::new(&config.commerce).unwrap());
        let gateway_client = Arc::new(GatewayClient::new(&config.gateway).unwrap());
        let otp = Arc::new(OtpStore::in_memory(config.otp.ttl()));

        let services = AppServices::new(
            &config,
            commerce_client.clone(),
            gateway_client,
            otp.clone(),
        );

        let state = AppState {
            config,
            commerce: commerce_client,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", storefront_api::api_v1_routes())
            .with_state(state);

        Self {
            router,
            commerce,
            gateway,
            otp,
        }
    }

    pub async fn request_json(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder
                    .body(Body::from(serde_json::to_vec(&json).unwrap()))
                    .unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Posts a form body the way the payment gateway delivers callbacks.
    pub async fn post_form(&self, path: &str, form_body: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Location header of a redirect response.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect location")
        .to_str()
        .unwrap()
        .to_string()
}
