use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::order::{BillingAddress, ShippingAddress};

/// Customer account as the commerce backend stores it.
///
/// Phone-based logins are indexed by a synthesized placeholder email, so the
/// email field is always present even for customers who never supplied one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerRecord {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub billing: BillingAddress,
    #[serde(default)]
    pub shipping: ShippingAddress,
}

/// Payload for creating a customer record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingAddress>,
}
