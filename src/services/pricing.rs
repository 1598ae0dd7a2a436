//! Cart pricing: shipping fee, bulk-order discount, and coupon handling.
//!
//! Pure and deterministic; recomputed on every cart mutation and never
//! persisted.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartLine;

/// Orders above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(999);

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Decimal = dec!(50);

/// Orders above this subtotal earn the bulk discount.
pub const BULK_DISCOUNT_THRESHOLD: Decimal = dec!(1500);

pub const BULK_DISCOUNT: Decimal = dec!(100);

/// The single accepted coupon code. Intentional placeholder until a coupon
/// service exists; matched case-insensitively.
const COUPON_CODE: &str = "TEAT01";

pub const COUPON_DISCOUNT: Decimal = dec!(50);

/// What happened to a submitted coupon code. An unknown code is flagged, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CouponOutcome {
    NotApplied,
    Applied,
    Invalid,
}

/// Derived pricing for a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingResult {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub bulk_discount: Decimal,
    pub coupon_discount: Decimal,
    pub grand_total: Decimal,
    pub coupon: CouponOutcome,
}

/// Prices a cart. Same lines and coupon always produce the same result.
pub fn quote(lines: &[CartLine], coupon_code: Option<&str>) -> PricingResult {
    let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();

    let shipping_fee = if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    };

    let bulk_discount = if subtotal > BULK_DISCOUNT_THRESHOLD {
        BULK_DISCOUNT
    } else {
        Decimal::ZERO
    };

    let (coupon_discount, coupon) = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        None => (Decimal::ZERO, CouponOutcome::NotApplied),
        Some(code) if code.eq_ignore_ascii_case(COUPON_CODE) => {
            (COUPON_DISCOUNT, CouponOutcome::Applied)
        }
        Some(_) => (Decimal::ZERO, CouponOutcome::Invalid),
    };

    let grand_total =
        (subtotal + shipping_fee - bulk_discount - coupon_discount).max(Decimal::ZERO);

    PricingResult {
        subtotal,
        shipping_fee,
        bulk_discount,
        coupon_discount,
        grand_total,
        coupon,
    }
}
