//! Order draft assembly: cart + address + pricing -> commerce backend payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    errors::ServiceError,
    models::{
        BillingAddress, CartLine, FeeLine, LineItemDraft, OrderDraft, PaymentMethod,
        ShippingAddress, ShippingLine,
    },
    services::pricing::PricingResult,
};

const DEFAULT_COUNTRY: &str = "IN";

/// Address fields collected by the checkout form.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddressInput {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub address_1: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub postcode: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl AddressInput {
    fn country(&self) -> String {
        self.country
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
    }
}

/// Rejects drafts with missing required contact fields before any network
/// call, naming the first missing field.
fn validate_address(address: &AddressInput) -> Result<(), ServiceError> {
    let required = [
        ("first_name", &address.first_name),
        ("last_name", &address.last_name),
        ("address_1", &address.address_1),
        ("city", &address.city),
        ("state", &address.state),
        ("postcode", &address.postcode),
        ("phone", &address.phone),
        ("email", &address.email),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ServiceError::Validation(format!(
                "billing {} is required",
                name
            )));
        }
    }
    Ok(())
}

/// Builds the order payload submitted to the commerce backend.
///
/// Line items carry only product id and quantity: the backend derives prices
/// from the catalog, while shipping and discounts travel as separate
/// shipping/fee lines so they are auditable on the order.
pub fn build_draft(
    lines: &[CartLine],
    address: &AddressInput,
    payment_method: PaymentMethod,
    pricing: &PricingResult,
    customer_id: Option<u64>,
) -> Result<OrderDraft, ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::Validation("Cart is empty".to_string()));
    }
    validate_address(address)?;

    let country = address.country();
    let billing = BillingAddress {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        address_1: address.address_1.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postcode: address.postcode.clone(),
        country: country.clone(),
        email: address.email.clone(),
        phone: address.phone.clone(),
    };
    let shipping = ShippingAddress {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        address_1: address.address_1.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postcode: address.postcode.clone(),
        country,
    };

    let line_items = lines
        .iter()
        .map(|l| LineItemDraft {
            product_id: l.product_id,
            quantity: l.quantity,
        })
        .collect();

    let mut draft = OrderDraft {
        payment_method: payment_method.code().to_string(),
        payment_method_title: payment_method.title().to_string(),
        set_paid: false,
        status: None,
        customer_id: customer_id.unwrap_or(0),
        billing,
        shipping,
        line_items,
        fee_lines: vec![],
        shipping_lines: vec![],
        meta_data: vec![],
    };

    if payment_method == PaymentMethod::Gateway {
        // Payment is not yet confirmed at draft time
        draft.status = Some("pending".to_string());

        draft.shipping_lines.push(if pricing.shipping_fee.is_zero() {
            ShippingLine {
                method_id: "free_shipping".to_string(),
                method_title: "Free Shipping".to_string(),
                total: pricing.shipping_fee.to_string(),
            }
        } else {
            ShippingLine {
                method_id: "flat_rate".to_string(),
                method_title: "Flat Rate".to_string(),
                total: pricing.shipping_fee.to_string(),
            }
        });

        if pricing.bulk_discount > rust_decimal::Decimal::ZERO {
            draft
                .fee_lines
                .push(FeeLine::zero_rated("Bulk Order Discount", -pricing.bulk_discount));
        }
        if pricing.coupon_discount > rust_decimal::Decimal::ZERO {
            draft
                .fee_lines
                .push(FeeLine::zero_rated("Coupon Discount", -pricing.coupon_discount));
        }
    }

    Ok(draft)
}
