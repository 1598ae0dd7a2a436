use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, instrument};

use crate::{
    config::CommerceConfig,
    errors::ServiceError,
    models::{CustomerRecord, NewCustomer, OrderDraft, OrderRecord, OrderUpdate, Product},
};

/// HTTP client for the commerce backend's REST surface.
///
/// The backend owns products, customers, and orders; this client is a thin
/// authenticated proxy with one fixed timeout for every call and no retries.
#[derive(Clone)]
pub struct CommerceClient {
    http: Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl CommerceClient {
    pub fn new(cfg: &CommerceConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| ServiceError::Backend(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            consumer_key: cfg.consumer_key.clone(),
            consumer_secret: cfg.consumer_secret.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            // Response bodies often carry the backend's own diagnostics;
            // log them but never surface them to buyers.
            let body = response.text().await.unwrap_or_default();
            error!(%status, path, body = %body, "commerce backend request failed");
            if status == StatusCode::NOT_FOUND {
                return Err(ServiceError::NotFound(format!("{} not found", path)));
            }
            return Err(ServiceError::Backend(format!("{} returned {}", path, status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Backend(format!("{} returned invalid JSON: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let response = self
            .http
            .get(self.url(path))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Backend(format!("GET {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self
            .http
            .post(self.url(path))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Backend(format!("POST {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self
            .http
            .put(self.url(path))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Backend(format!("PUT {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    /// Full catalog listing.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        self.get_json("products", &[]).await
    }

    /// Single product by slug; the backend answers slug queries with a list.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
        let products: Vec<Product> = self
            .get_json("products", &[("slug", slug.to_string())])
            .await?;
        Ok(products.into_iter().next())
    }

    #[instrument(skip(self))]
    pub async fn product_variations(&self, product_id: u64) -> Result<Vec<Product>, ServiceError> {
        self.get_json(&format!("products/{}/variations", product_id), &[])
            .await
    }

    /// Exact-email customer lookup.
    #[instrument(skip(self))]
    pub async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CustomerRecord>, ServiceError> {
        let customers: Vec<CustomerRecord> = self
            .get_json("customers", &[("email", email.to_string())])
            .await?;
        Ok(customers.into_iter().next())
    }

    #[instrument(skip(self, customer), fields(email = %customer.email))]
    pub async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<CustomerRecord, ServiceError> {
        self.post_json("customers", customer).await
    }

    #[instrument(skip(self))]
    pub async fn orders_for_customer(
        &self,
        customer_id: u64,
    ) -> Result<Vec<OrderRecord>, ServiceError> {
        self.get_json("orders", &[("customer", customer_id.to_string())])
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: u64) -> Result<OrderRecord, ServiceError> {
        self.get_json(&format!("orders/{}", order_id), &[]).await
    }

    /// Submits an order draft; the backend assigns the id and order key.
    #[instrument(skip(self, draft), fields(payment_method = %draft.payment_method))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<OrderRecord, ServiceError> {
        self.post_json("orders", draft).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_order(
        &self,
        order_id: u64,
        update: &OrderUpdate,
    ) -> Result<OrderRecord, ServiceError> {
        self.put_json(&format!("orders/{}", order_id), update).await
    }
}
