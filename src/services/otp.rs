//! One-time-code store for the phone login flow.
//!
//! Codes live in an explicit TTL-bound store keyed by phone number, so every
//! server instance sees the same pending codes and restarts cannot resurrect
//! stale ones. Backends mirror the cache selection pattern used elsewhere:
//! an in-memory map for development and Redis for deployments.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;
use tracing::{info, instrument};

use crate::errors::ServiceError;

const CODE_LEN: usize = 6;

#[derive(Clone)]
struct PendingCode {
    code: String,
    expires_at: Instant,
}

enum Backend {
    InMemory(DashMap<String, PendingCode>),
    Redis(Arc<redis::Client>),
}

/// TTL-bound, single-use verification code store.
pub struct OtpStore {
    backend: Backend,
    ttl: Duration,
}

impl OtpStore {
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            backend: Backend::InMemory(DashMap::new()),
            ttl,
        }
    }

    pub fn redis(client: Arc<redis::Client>, ttl: Duration) -> Self {
        Self {
            backend: Backend::Redis(client),
            ttl,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::InMemory(_) => "in-memory",
            Backend::Redis(_) => "redis",
        }
    }

    fn key(phone: &str) -> String {
        format!("otp:{}", phone)
    }

    /// Issues a fresh code for a phone number, replacing any pending one.
    #[instrument(skip(self))]
    pub async fn issue(&self, phone: &str) -> Result<String, ServiceError> {
        let code = generate_code();
        let key = Self::key(phone);

        match &self.backend {
            Backend::InMemory(map) => {
                map.insert(
                    key,
                    PendingCode {
                        code: code.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
            Backend::Redis(client) => {
                let mut conn = client
                    .get_async_connection()
                    .await
                    .map_err(|e| ServiceError::Cache(e.to_string()))?;
                redis::cmd("SET")
                    .arg(&key)
                    .arg(&code)
                    .arg("EX")
                    .arg(self.ttl.as_secs())
                    .query_async::<_, ()>(&mut conn)
                    .await
                    .map_err(|e| ServiceError::Cache(e.to_string()))?;
            }
        }

        info!(phone, "verification code issued");
        Ok(code)
    }

    /// Checks a submitted code. A matching code is consumed; a mismatch
    /// leaves the pending code in place until its TTL runs out.
    #[instrument(skip(self, submitted))]
    pub async fn verify(&self, phone: &str, submitted: &str) -> Result<bool, ServiceError> {
        let key = Self::key(phone);

        match &self.backend {
            Backend::InMemory(map) => {
                let now = Instant::now();
                map.remove_if(&key, |_, v| v.expires_at <= now);
                Ok(map.remove_if(&key, |_, v| v.code == submitted).is_some())
            }
            Backend::Redis(client) => {
                let mut conn = client
                    .get_async_connection()
                    .await
                    .map_err(|e| ServiceError::Cache(e.to_string()))?;
                let stored: Option<String> = redis::cmd("GET")
                    .arg(&key)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| ServiceError::Cache(e.to_string()))?;

                match stored {
                    Some(code) if code == submitted => {
                        let _: () = redis::cmd("DEL")
                            .arg(&key)
                            .query_async(&mut conn)
                            .await
                            .map_err(|e| ServiceError::Cache(e.to_string()))?;
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    /// Health probe for the backing store.
    pub async fn ping(&self) -> bool {
        match &self.backend {
            Backend::InMemory(_) => true,
            Backend::Redis(client) => match client.get_async_connection().await {
                Ok(mut conn) => redis::cmd("PING")
                    .query_async::<_, String>(&mut conn)
                    .await
                    .is_ok(),
                Err(_) => false,
            },
        }
    }
}

fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:0width$}", n, width = CODE_LEN)
}
