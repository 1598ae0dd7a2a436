use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::{config::GatewayConfig, errors::ServiceError};

type HmacSha256 = Hmac<Sha256>;

/// Notes attached to a gateway order, linking it back to the commerce
/// backend's order record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderNotes {
    pub order_id: u64,
    pub order_key: String,
}

/// The gateway's side record of a checkout attempt. Created once, never
/// mutated by this system.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Minor currency units (paise)
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

/// Error envelope the gateway returns on failed requests.
#[derive(Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    error: GatewayErrorDetail,
}

#[derive(Default, Deserialize)]
struct GatewayErrorDetail {
    #[serde(default)]
    description: String,
}

/// HTTP client for the hosted payment gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl GatewayClient {
    pub fn new(cfg: &GatewayConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| ServiceError::Gateway(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            key_id: cfg.key_id.clone(),
            key_secret: cfg.key_secret.clone(),
            currency: cfg.currency.clone(),
        })
    }

    /// Public key id, handed to the client-side widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Creates a gateway order for `amount_minor` minor units.
    #[instrument(skip(self, notes), fields(order_id = notes.order_id))]
    pub async fn create_order(
        &self,
        amount_minor: i64,
        receipt: &str,
        notes: &OrderNotes,
    ) -> Result<GatewayOrder, ServiceError> {
        let body = CreateOrderBody {
            amount: amount_minor,
            currency: &self.currency,
            receipt,
            notes,
        };

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(format!("order creation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(%status, body = %text, "gateway order creation failed");
            // Surface the gateway's own message when it sends one
            let detail = serde_json::from_str::<GatewayErrorBody>(&text)
                .map(|b| b.error.description)
                .ok()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("order creation returned {}", status));
            return Err(ServiceError::Gateway(detail));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| ServiceError::Gateway(format!("invalid order response: {}", e)))
    }

    /// Verifies the signature the gateway attaches to a payment callback.
    pub fn verify_callback_signature(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
        supplied: &str,
    ) -> bool {
        verify_signature(&self.key_secret, gateway_order_id, payment_id, supplied)
    }
}

/// Converts a currency amount to minor units, rounding half away from zero.
///
/// This is the only place the conversion happens so the gateway amount can
/// never drift from the priced total.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ServiceError> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            ServiceError::Gateway(format!("amount {} out of range for minor units", amount))
        })
}

/// Expected callback signature: hex-encoded HMAC-SHA256 over
/// `{gateway_order_id}|{payment_id}` with the server-held key secret.
pub fn expected_signature(secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{}|{}", gateway_order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Exact, case-sensitive signature check. This is the sole authorization gate
/// for marking money received.
pub fn verify_signature(
    secret: &str,
    gateway_order_id: &str,
    payment_id: &str,
    supplied: &str,
) -> bool {
    constant_time_eq(&expected_signature(secret, gateway_order_id, payment_id), supplied)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
