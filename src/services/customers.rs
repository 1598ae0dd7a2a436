//! Customer resolution: maps identity assertions (social login email or a
//! verified phone number) onto commerce backend customer records.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    clients::CommerceClient,
    errors::ServiceError,
    models::{BillingAddress, CustomerRecord, NewCustomer, OrderRecord},
};

const LOGIN_FAILED: &str = "Login failed";

/// A resolved customer with their order history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginData {
    pub user: CustomerRecord,
    pub orders: Vec<OrderRecord>,
}

/// Finds or creates customer records from identity assertions.
///
/// The backend indexes customers by email, so phone-based logins use a
/// synthesized placeholder address under a fixed domain.
#[derive(Clone)]
pub struct CustomerResolver {
    commerce: Arc<CommerceClient>,
    guest_email_domain: String,
}

impl CustomerResolver {
    pub fn new(commerce: Arc<CommerceClient>, guest_email_domain: String) -> Self {
        Self {
            commerce,
            guest_email_domain,
        }
    }

    /// Resolves a social-login identity. Backend failures are swallowed and
    /// reported uniformly so no partial customer state reaches the client.
    #[instrument(skip(self, avatar_url))]
    pub async fn login_social(
        &self,
        email: &str,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<LoginData, ServiceError> {
        match self.resolve_social(email, display_name, avatar_url).await {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(error = %e, "social login resolution failed");
                Err(ServiceError::Auth(LOGIN_FAILED.to_string()))
            }
        }
    }

    async fn resolve_social(
        &self,
        email: &str,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<LoginData, ServiceError> {
        let customer = match self.commerce.find_customer_by_email(email).await? {
            Some(existing) => existing,
            None => {
                info!("creating customer record for first-time login");
                let (first_name, last_name) = split_display_name(display_name);
                let new = NewCustomer {
                    email: email.to_string(),
                    first_name,
                    last_name,
                    username: email_local_part(email),
                    avatar_url: avatar_url.map(str::to_string),
                    billing: None,
                };
                self.commerce.create_customer(&new).await?
            }
        };

        let orders = self.order_history(customer.id).await;
        Ok(LoginData {
            user: customer,
            orders,
        })
    }

    /// Resolves a phone identity from the OTP flow.
    #[instrument(skip(self))]
    pub async fn login_phone(&self, phone: &str) -> Result<LoginData, ServiceError> {
        let digits = normalize_phone(phone);
        if digits.len() < 10 {
            return Err(ServiceError::Validation("Invalid phone number".to_string()));
        }

        match self.resolve_phone(&digits).await {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(error = %e, "phone login resolution failed");
                Err(ServiceError::Auth(LOGIN_FAILED.to_string()))
            }
        }
    }

    async fn resolve_phone(&self, digits: &str) -> Result<LoginData, ServiceError> {
        let placeholder = self.placeholder_email(digits);

        let customer = match self.commerce.find_customer_by_email(&placeholder).await? {
            Some(existing) => existing,
            None => {
                info!("creating guest customer record for phone login");
                let new = NewCustomer {
                    email: placeholder.clone(),
                    first_name: "Guest".to_string(),
                    last_name: "User".to_string(),
                    username: digits.to_string(),
                    avatar_url: None,
                    billing: Some(BillingAddress {
                        phone: digits.to_string(),
                        email: placeholder,
                        ..Default::default()
                    }),
                };
                self.commerce.create_customer(&new).await?
            }
        };

        let orders = self.order_history(customer.id).await;
        Ok(LoginData {
            user: customer,
            orders,
        })
    }

    /// Deterministic placeholder email for phone-indexed customers.
    pub fn placeholder_email(&self, digits: &str) -> String {
        format!("{}@{}", digits, self.guest_email_domain)
    }

    /// Order history is best-effort: a failed fetch degrades to an empty
    /// list rather than failing the whole login.
    async fn order_history(&self, customer_id: u64) -> Vec<OrderRecord> {
        match self.commerce.orders_for_customer(customer_id).await {
            Ok(orders) => orders,
            Err(e) => {
                warn!(customer_id, error = %e, "failed to fetch order history");
                Vec::new()
            }
        }
    }
}

/// First whitespace-delimited token becomes the first name; the remainder,
/// joined, becomes the last name.
pub fn split_display_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Strips everything but digits from a phone number.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
