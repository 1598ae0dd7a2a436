//! Checkout orchestration: pending order creation, gateway order creation,
//! and signature-verified payment finalization.
//!
//! The sequence is linear and never retried: every failure is terminal for
//! the attempt and the buyer starts a fresh one. The only shared state
//! between concurrent attempts is the commerce backend's own id allocator.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    clients::{
        gateway::{self, OrderNotes},
        CommerceClient, GatewayClient,
    },
    config::AppConfig,
    errors::ServiceError,
    models::{CartLine, MetaData, OrderUpdate, PaymentMethod},
    services::{
        drafts::{self, AddressInput},
        pricing::{self, PricingResult},
    },
};

/// Transitions of a checkout attempt, used for failure telemetry. Each stage
/// can fail terminally; nothing before it is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CheckoutStage {
    OrderCreation,
    GatewayOrder,
    MissingFields,
    InvalidSignature,
    Finalize,
}

/// A complete checkout submission from the storefront.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub cart: Vec<CartLine>,
    pub billing: AddressInput,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Present when the buyer is logged in; links the order to their account
    #[serde(default)]
    pub customer_id: Option<u64>,
}

/// Buyer details prefilled into the hosted payment widget.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WidgetPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the client-side widget needs to collect payment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WidgetParams {
    pub key: String,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    /// The gateway-side order id
    pub order_id: String,
    /// Server callback invoked by the gateway when payment completes,
    /// independent of whether the buyer's page is still open
    pub callback_url: String,
    pub prefill: WidgetPrefill,
    pub notes: OrderNotes,
}

/// Result of starting a checkout.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    /// Cash-on-delivery order placed; no payment collection required.
    Placed {
        order_id: u64,
        order_key: String,
        pricing: PricingResult,
    },
    /// Pending order created; the buyer must complete payment in the widget.
    PaymentRequired {
        order_id: u64,
        order_key: String,
        pricing: PricingResult,
        widget: WidgetParams,
    },
}

/// Fields delivered by the gateway's form-encoded payment callback.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CallbackForm {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

fn validate_callback_fields(
    order_id: Option<u64>,
    form: &CallbackForm,
) -> Result<(u64, String, String, String), ServiceError> {
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

    match (
        order_id,
        non_empty(&form.razorpay_payment_id),
        non_empty(&form.razorpay_order_id),
        non_empty(&form.razorpay_signature),
    ) {
        (Some(order_id), Some(payment_id), Some(gateway_order_id), Some(signature)) => {
            Ok((order_id, payment_id, gateway_order_id, signature))
        }
        _ => Err(ServiceError::MissingFields(
            "payment callback did not include all required fields".to_string(),
        )),
    }
}

/// Orchestrates the checkout/payment sequence against both external services.
#[derive(Clone)]
pub struct CheckoutService {
    commerce: Arc<CommerceClient>,
    gateway: Arc<GatewayClient>,
    config: AppConfig,
}

impl CheckoutService {
    pub fn new(commerce: Arc<CommerceClient>, gateway: Arc<GatewayClient>, config: AppConfig) -> Self {
        Self {
            commerce,
            gateway,
            config,
        }
    }

    /// Starts a checkout attempt: prices the cart, creates the pending order
    /// on the commerce backend and, for gateway payments, the gateway-side
    /// order the hosted widget collects against.
    #[instrument(skip(self, request), fields(lines = request.cart.len(), method = ?request.payment_method))]
    pub async fn begin(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, ServiceError> {
        let pricing = pricing::quote(&request.cart, request.coupon_code.as_deref());
        let draft = drafts::build_draft(
            &request.cart,
            &request.billing,
            request.payment_method,
            &pricing,
            request.customer_id,
        )?;

        let order = self.commerce.create_order(&draft).await.map_err(|e| {
            warn!(stage = %CheckoutStage::OrderCreation, error = %e, "order creation failed");
            e
        })?;
        info!(order_id = order.id, total = %order.total, "pending order created");

        if request.payment_method == PaymentMethod::CashOnDelivery {
            return Ok(CheckoutOutcome::Placed {
                order_id: order.id,
                order_key: order.order_key,
                pricing,
            });
        }

        // The gateway amount comes from the persisted order total so the
        // charge can never drift from what the backend recorded.
        let amount_minor = gateway::to_minor_units(order.total_amount()?)?;
        let receipt = format!("rcpt_{}", order.id);
        let notes = OrderNotes {
            order_id: order.id,
            order_key: order.order_key.clone(),
        };

        let gateway_order = self
            .gateway
            .create_order(amount_minor, &receipt, &notes)
            .await
            .map_err(|e| {
                // The pending order stays behind; reconciliation of orphaned
                // pending orders is a manual process.
                warn!(
                    order_id = order.id,
                    stage = %CheckoutStage::GatewayOrder,
                    error = %e,
                    "gateway order creation failed; pending order left as-is"
                );
                e
            })?;
        info!(
            order_id = order.id,
            gateway_order_id = %gateway_order.id,
            amount_minor,
            "gateway order created"
        );

        let widget = WidgetParams {
            key: self.gateway.key_id().to_string(),
            amount: gateway_order.amount,
            currency: gateway_order.currency.clone(),
            order_id: gateway_order.id,
            callback_url: self.config.payment_callback_url(order.id),
            prefill: WidgetPrefill {
                name: format!("{} {}", request.billing.first_name, request.billing.last_name),
                email: request.billing.email.clone(),
                contact: request.billing.phone.clone(),
            },
            notes,
        };

        Ok(CheckoutOutcome::PaymentRequired {
            order_id: order.id,
            order_key: order.order_key,
            pricing,
            widget,
        })
    }

    /// Handles the gateway's payment callback: verifies the signature and
    /// finalizes the order. Returns the finalized order id.
    #[instrument(skip(self, form))]
    pub async fn handle_callback(
        &self,
        order_id: Option<u64>,
        form: CallbackForm,
    ) -> Result<u64, ServiceError> {
        let (order_id, payment_id, gateway_order_id, signature) =
            validate_callback_fields(order_id, &form).map_err(|e| {
                warn!(stage = %CheckoutStage::MissingFields, "payment callback missing required fields");
                e
            })?;

        if !self
            .gateway
            .verify_callback_signature(&gateway_order_id, &payment_id, &signature)
        {
            warn!(
                order_id,
                stage = %CheckoutStage::InvalidSignature,
                "payment callback signature mismatch; order will not be marked paid"
            );
            return Err(ServiceError::Signature(format!(
                "signature mismatch for order {}",
                order_id
            )));
        }

        self.finalize(order_id, &gateway_order_id, &payment_id, &signature)
            .await?;
        Ok(order_id)
    }

    /// Marks a verified order as paid. Safe to apply more than once for the
    /// same payment id: an already-finalized order is left untouched.
    async fn finalize(
        &self,
        order_id: u64,
        gateway_order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), ServiceError> {
        match self.commerce.get_order(order_id).await {
            Ok(existing) if existing.is_paid() && existing.transaction_id == payment_id => {
                info!(order_id, "order already finalized for this payment; skipping update");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                // Best-effort pre-check; the update below still decides the outcome
                warn!(order_id, error = %e, "could not pre-check order state before finalizing");
            }
        }

        let update = OrderUpdate {
            status: Some("processing".to_string()),
            set_paid: Some(true),
            transaction_id: Some(payment_id.to_string()),
            date_paid: Some(Utc::now().to_rfc3339()),
            meta_data: vec![
                MetaData::new("razorpay_payment_id", payment_id),
                MetaData::new("razorpay_order_id", gateway_order_id),
                MetaData::new("razorpay_signature", signature),
                MetaData::new("payment_method_title", PaymentMethod::Gateway.title()),
            ],
        };

        if let Err(e) = self.commerce.update_order(order_id, &update).await {
            // Money has moved but the order has not: log on a dedicated
            // target so these surface for manual follow-up.
            error!(
                target: "reconciliation",
                order_id,
                payment_id,
                stage = %CheckoutStage::Finalize,
                error = %e,
                "payment captured but order update failed"
            );
            return Err(ServiceError::ReconciliationGap {
                order_id,
                detail: format!("payment {} captured but order update failed: {}", payment_id, e),
            });
        }

        info!(order_id, payment_id, "order finalized as paid");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn full_form() -> CallbackForm {
        CallbackForm {
            razorpay_payment_id: Some("pay_1".into()),
            razorpay_order_id: Some("order_1".into()),
            razorpay_signature: Some("sig".into()),
        }
    }

    #[test]
    fn complete_callback_fields_pass() {
        let (order_id, payment_id, gateway_order_id, signature) =
            validate_callback_fields(Some(7), &full_form()).unwrap();
        assert_eq!(order_id, 7);
        assert_eq!(payment_id, "pay_1");
        assert_eq!(gateway_order_id, "order_1");
        assert_eq!(signature, "sig");
    }

    #[test]
    fn absent_order_reference_is_missing_fields() {
        let err = validate_callback_fields(None, &full_form()).unwrap_err();
        assert_matches!(err, ServiceError::MissingFields(_));
    }

    #[test]
    fn empty_form_values_count_as_missing() {
        let mut form = full_form();
        form.razorpay_signature = Some(String::new());
        let err = validate_callback_fields(Some(7), &form).unwrap_err();
        assert_matches!(err, ServiceError::MissingFields(_));
    }

    #[test]
    fn stage_labels_are_kebab_case() {
        assert_eq!(CheckoutStage::OrderCreation.to_string(), "order-creation");
        assert_eq!(CheckoutStage::InvalidSignature.to_string(), "invalid-signature");
        assert_eq!(CheckoutStage::GatewayOrder.to_string(), "gateway-order");
    }
}
