//! HTTP handlers and the service container they share.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod orders;
pub mod products;

use std::sync::Arc;

use crate::{
    clients::{CommerceClient, GatewayClient},
    config::AppConfig,
    services::{CatalogService, CheckoutService, CustomerResolver, OtpStore},
};

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub checkout: Arc<CheckoutService>,
    pub customers: Arc<CustomerResolver>,
    pub otp: Arc<OtpStore>,
}

impl AppServices {
    pub fn new(
        config: &AppConfig,
        commerce: Arc<CommerceClient>,
        gateway: Arc<GatewayClient>,
        otp: Arc<OtpStore>,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(
            commerce.clone(),
            config.upsell_limit,
        ));
        let checkout = Arc::new(CheckoutService::new(
            commerce.clone(),
            gateway,
            config.clone(),
        ));
        let customers = Arc::new(CustomerResolver::new(
            commerce,
            config.guest_email_domain.clone(),
        ));

        Self {
            catalog,
            checkout,
            customers,
            otp,
        }
    }
}
