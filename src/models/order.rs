use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Billing address as the commerce backend stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BillingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Shipping address; the backend schema carries no email/phone here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

/// Payment methods reachable from the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    #[serde(rename = "cod")]
    CashOnDelivery,
    #[serde(rename = "razorpay")]
    Gateway,
}

impl PaymentMethod {
    /// Method code the commerce backend expects in `payment_method`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cod",
            Self::Gateway => "razorpay",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Gateway => "Online Payment (Razorpay)",
        }
    }
}

/// Order line item as submitted; price is intentionally omitted so the
/// backend derives it from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineItemDraft {
    pub product_id: u64,
    pub quantity: u32,
}

/// Fee line; discounts are submitted as negative totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeeLine {
    pub name: String,
    pub total: String,
    pub tax_status: String,
}

impl FeeLine {
    /// A zero-rated fee line, used for discounts so tax is never computed
    /// against a negative amount.
    pub fn zero_rated(name: impl Into<String>, total: Decimal) -> Self {
        Self {
            name: name.into(),
            total: total.to_string(),
            tax_status: "none".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingLine {
    pub method_id: String,
    pub method_title: String,
    pub total: String,
}

/// Arbitrary key/value metadata entry on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetaData {
    pub key: String,
    pub value: serde_json::Value,
}

impl MetaData {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Locally assembled, not-yet-persisted order payload.
///
/// Built fresh per checkout attempt and submitted once; the backend assigns
/// the id and the secret order key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDraft {
    pub payment_method: String,
    pub payment_method_title: String,
    pub set_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// 0 for guest checkout
    pub customer_id: u64,
    pub billing: BillingAddress,
    pub shipping: ShippingAddress,
    pub line_items: Vec<LineItemDraft>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fee_lines: Vec<FeeLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

/// Order lifecycle states owned by the commerce backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LineItemRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub product_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total: String,
}

/// The commerce backend's persisted order, read-only to this system apart
/// from the status-field update applied at payment finalization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderRecord {
    pub id: u64,
    #[serde(default)]
    pub order_key: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub currency: String,
    /// Backend serializes money as decimal strings
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_paid: Option<String>,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(default)]
    pub billing: BillingAddress,
    #[serde(default)]
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub line_items: Vec<LineItemRecord>,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

impl OrderRecord {
    pub fn is_paid(&self) -> bool {
        self.date_paid.as_deref().map_or(false, |d| !d.is_empty())
    }

    /// Parses the backend's decimal-string total.
    pub fn total_amount(&self) -> Result<Decimal, ServiceError> {
        Decimal::from_str(&self.total).map_err(|e| {
            ServiceError::Backend(format!(
                "order {} carries unparseable total {:?}: {}",
                self.id, self.total, e
            ))
        })
    }
}

/// Partial update applied when a verified payment finalizes an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_paid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}
