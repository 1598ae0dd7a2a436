use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_COMMERCE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GATEWAY_BASE_URL: &str = "https://api.razorpay.com/v1";
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_OTP_BACKEND: &str = "in-memory";
const DEFAULT_OTP_TTL_SECS: u64 = 300;
const DEFAULT_UPSELL_LIMIT: usize = 10;

/// Commerce backend (product/customer/order REST API) connection settings
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CommerceConfig {
    /// REST root of the commerce backend, e.g. `https://shop.example.com/wp-json/wc/v3`
    #[validate(url)]
    pub base_url: String,

    /// API consumer key
    #[validate(length(min = 1))]
    pub consumer_key: String,

    /// API consumer secret
    #[validate(custom = "validate_secret")]
    pub consumer_secret: String,

    /// Single fixed request timeout applied to every backend call
    #[serde(default = "default_commerce_timeout_secs")]
    pub timeout_secs: u64,
}

impl CommerceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Hosted payment gateway settings
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Gateway REST root
    #[serde(default = "default_gateway_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Public key id, also handed to the client-side widget
    #[validate(length(min = 1))]
    pub key_id: String,

    /// Server-held secret; signs checkout callbacks
    #[validate(custom = "validate_secret")]
    pub key_secret: String,

    /// ISO currency code for gateway orders
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,

    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One-time-code store settings for the phone login flow.
///
/// Codes are always held in an explicit TTL-bound store, never in process
/// globals, so multiple server instances agree on pending codes.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OtpConfig {
    /// "in-memory" or "redis"
    #[serde(default = "default_otp_backend")]
    #[validate(custom = "validate_otp_backend")]
    pub backend: String,

    /// Redis connection URL when backend = "redis"
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Lifetime of an issued code
    #[serde(default = "default_otp_ttl_secs")]
    pub ttl_secs: u64,
}

impl OtpConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Public base URL of this API; payment callback URLs are built from it
    #[validate(url)]
    pub public_base_url: String,

    /// Storefront checkout page; payment callbacks 303-redirect here
    #[validate(url)]
    pub storefront_checkout_url: String,

    /// Domain used to synthesize placeholder emails for phone-based logins
    #[serde(default = "default_guest_email_domain")]
    #[validate(length(min = 3))]
    pub guest_email_domain: String,

    /// Number of products returned by the upsell selection
    #[serde(default = "default_upsell_limit")]
    pub upsell_limit: usize,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[validate]
    pub commerce: CommerceConfig,

    #[validate]
    pub gateway: GatewayConfig,

    #[serde(default)]
    #[validate]
    pub otp: OtpConfig,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            backend: default_otp_backend(),
            redis_url: default_redis_url(),
            ttl_secs: default_otp_ttl_secs(),
        }
    }
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// URL the gateway calls back after payment, carrying the order id so the
    /// callback does not depend on the buyer's browser staying connected.
    pub fn payment_callback_url(&self, order_id: u64) -> String {
        format!(
            "{}/api/v1/payments/callback?order_id={}",
            self.public_base_url.trim_end_matches('/'),
            order_id
        )
    }

    /// Redirect target for a finished payment callback.
    pub fn checkout_redirect(&self, query: &str) -> String {
        format!("{}?{}", self.storefront_checkout_url, query)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_commerce_timeout_secs() -> u64 {
    DEFAULT_COMMERCE_TIMEOUT_SECS
}

fn default_gateway_timeout_secs() -> u64 {
    DEFAULT_GATEWAY_TIMEOUT_SECS
}

fn default_gateway_base_url() -> String {
    DEFAULT_GATEWAY_BASE_URL.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_otp_backend() -> String {
    DEFAULT_OTP_BACKEND.to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_otp_ttl_secs() -> u64 {
    DEFAULT_OTP_TTL_SECS
}

fn default_guest_email_domain() -> String {
    "guest.example.com".to_string()
}

fn default_upsell_limit() -> usize {
    DEFAULT_UPSELL_LIMIT
}

fn validate_otp_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "in-memory" | "redis" => Ok(()),
        _ => {
            let mut err = ValidationError::new("otp_backend");
            err.message = Some("Must be one of: in-memory, redis".into());
            Err(err)
        }
    }
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Rejects empty secrets and obvious placeholders so a misconfigured deploy
/// fails at startup instead of at the first signature check.
fn validate_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if trimmed.len() < 8 {
        let mut err = ValidationError::new("secret");
        err.message = Some("Secret must be at least 8 characters".into());
        return Err(err);
    }

    const DISALLOWED: [&str; 4] = ["changeme", "secret", "placeholder", "xxxxxxxx"];
    let lower = trimmed.to_ascii_lowercase();
    if DISALLOWED.iter().any(|&bad| lower == bad) {
        let mut err = ValidationError::new("secret");
        err.message = Some("Secret must be overridden with the provider-issued value".into());
        return Err(err);
    }

    Ok(())
}

/// Initializes tracing using the provided log level as the default filter.
///
/// Known-noisy dependency internals (HTTP/2 window chatter, connection pool
/// churn) are capped at warn via the filter directive rather than by patching
/// any global diagnostic hook.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!(
        "storefront_api={},tower_http=info,h2=warn,hyper_util=warn",
        level
    );
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    // NOTE: commerce and gateway credentials have no defaults - they MUST be
    // provided via environment variables or config files.
    let builder = Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("public_base_url", "http://localhost:8080")?
        .set_default("storefront_checkout_url", "http://localhost:3000/checkout")?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));

    let config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    for required in [
        "commerce.base_url",
        "commerce.consumer_key",
        "commerce.consumer_secret",
        "gateway.key_id",
        "gateway.key_secret",
    ] {
        if config.get_string(required).is_err() {
            let env_name = format!("APP__{}", required.replace('.', "__").to_uppercase());
            error!(
                "{} is not configured. Set the {} environment variable.",
                required, env_name
            );
            return Err(AppConfigError::Load(ConfigError::NotFound(format!(
                "{} is required but not configured",
                required
            ))));
        }
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            environment: "production".into(),
            log_level: "info".into(),
            log_json: false,
            public_base_url: "https://api.shop.example.com".into(),
            storefront_checkout_url: "https://shop.example.com/checkout".into(),
            guest_email_domain: "guest.example.com".into(),
            upsell_limit: 10,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            commerce: CommerceConfig {
                base_url: "https://shop.example.com/wp-json/wc/v3".into(),
                consumer_key: "ck_live_1234".into(),
                consumer_secret: "cs_live_abcdef0123456789".into(),
                timeout_secs: 60,
            },
            gateway: GatewayConfig {
                base_url: DEFAULT_GATEWAY_BASE_URL.into(),
                key_id: "key_live_1234".into(),
                key_secret: "gw_secret_abcdef012345".into(),
                currency: "INR".into(),
                timeout_secs: 30,
            },
            otp: OtpConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn placeholder_secret_is_rejected() {
        let mut cfg = base_config();
        cfg.gateway.key_secret = "changeme".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn short_secret_is_rejected() {
        let mut cfg = base_config();
        cfg.commerce.consumer_secret = "short".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn invalid_otp_backend_is_rejected() {
        let mut cfg = base_config();
        cfg.otp.backend = "memcached".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn callback_url_carries_order_id() {
        let cfg = base_config();
        assert_eq!(
            cfg.payment_callback_url(412),
            "https://api.shop.example.com/api/v1/payments/callback?order_id=412"
        );
    }

    #[test]
    fn development_allows_permissive_cors() {
        let mut cfg = base_config();
        assert!(!cfg.should_allow_permissive_cors());
        cfg.environment = "development".into();
        assert!(cfg.should_allow_permissive_cors());
    }
}
