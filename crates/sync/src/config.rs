//! Sync service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SYNC_API_TOKEN` - Bearer token guarding the `/api/sync/*` routes
//! - `WOOCOMMERCE_URL` - Shop base URL (e.g., <https://shop.example.com>)
//! - `WOOCOMMERCE_CONSUMER_KEY` - REST API consumer key (`ck_...`)
//! - `WOOCOMMERCE_CONSUMER_SECRET` - REST API consumer secret (`cs_...`)
//! - `HOLDED_API_KEY` - Holded API key
//!
//! ## Optional
//! - `SYNC_DATABASE_URL` - `SQLite` URL (fallback `DATABASE_URL`, default: sqlite://woo-holded-sync.db)
//! - `SYNC_HOST` - Bind address (default: 127.0.0.1)
//! - `SYNC_PORT` - Listen port (default: 3002)
//! - `SYNC_LOG_JSON` - Emit JSON logs when set
//! - `WOOCOMMERCE_WEBHOOK_SECRET` - Secret of the order webhook (webhook disabled without it)
//! - `HOLDED_API_URL` - API base URL (default: <https://api.holded.com/api>)
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - Sentry error tracking
//!
//! ## Optional (product import)
//! - `SYNC_BATCH_SIZE` - Products per batch (default: 5)
//! - `SYNC_TAG_FILTER` - Only import Holded products carrying this tag
//! - `SYNC_PRICE_RATE` - Holded rate id to take prices from (default: base price)
//! - `SYNC_STOCK` - Import stock levels (default: true)
//! - `SYNC_CATEGORIES` - Import tags as product categories (default: false)
//! - `SYNC_PRICES_INCLUDE_TAX` - Shop prices are entered with tax (default: false)
//! - `SYNC_PRODUCT_STATUS` - Status of new products (default: draft)
//! - `SYNC_BACKORDERS` - Backorder policy `no|notify|yes` (default: no)
//!
//! ## Optional (order export)
//! - `ORDER_DOC_TYPE` - `invoice|salesreceipt|salesorder|proform|waybill|nosync` (default: invoice)
//! - `ORDER_EXPORT_STATUS` - Status that triggers export (default: completed)
//! - `ORDER_SERIES_ID` / `ORDER_DESIGN_ID` / `ORDER_SALES_CHANNEL_ID` - Holded document options
//! - `ORDER_APPROVE` - Approve documents on creation (default: true)
//! - `ORDER_MARK_PAID` - Register the payment of paid orders (default: false)
//! - `ORDER_SYNC_FREE` - Export orders with a zero total (default: false)
//! - `ORDER_SHIPPING_LABEL` - Prefix of shipping lines (default: Shipping)
//!
//! ## Optional (summary email - all of `SMTP_HOST`, `SMTP_USERNAME`,
//! `SMTP_PASSWORD`, `SMTP_FROM` and `SYNC_REPORT_TO` together)
//! - `SMTP_PORT` - SMTP port (default: 587)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use woo_holded_core::{BackorderPolicy, DocumentType, OrderStatus, ProductStatus};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_DATABASE_URL: &str = "sqlite://woo-holded-sync.db";
const DEFAULT_HOLDED_API_URL: &str = "https://api.holded.com/api";
const DEFAULT_BATCH_SIZE: u32 = 5;
const MAX_BATCH_SIZE: u32 = 100;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Sync service configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// `SQLite` database URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token for the sync API
    pub api_token: SecretString,
    /// WooCommerce REST API configuration
    pub woocommerce: WooCommerceConfig,
    /// Holded API configuration
    pub holded: HoldedConfig,
    /// Product import behaviour
    pub products: ProductSyncConfig,
    /// Order export behaviour
    pub orders: OrderExportConfig,
    /// Summary email configuration (optional)
    pub email: Option<EmailConfig>,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "staging", "production")
    pub sentry_environment: Option<String>,
}

/// WooCommerce REST API configuration.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct WooCommerceConfig {
    /// Shop base URL, without the `/wp-json` suffix
    pub base_url: String,
    /// REST API consumer key
    pub consumer_key: String,
    /// REST API consumer secret
    pub consumer_secret: SecretString,
    /// Secret used to sign order webhooks
    pub webhook_secret: Option<SecretString>,
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Holded API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct HoldedConfig {
    /// API base URL (everything before `/invoicing/v1`)
    pub api_url: String,
    /// Holded API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for HoldedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldedConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// How Holded products are imported into WooCommerce.
#[derive(Debug, Clone)]
pub struct ProductSyncConfig {
    /// Products processed per batch
    pub batch_size: u32,
    /// Only products carrying this Holded tag are imported
    pub tag_filter: Option<String>,
    /// Holded rate id prices are taken from
    pub price_rate: Option<String>,
    /// Import stock levels
    pub sync_stock: bool,
    /// Import Holded tags as product categories
    pub import_categories: bool,
    /// Shop prices are entered including tax
    pub prices_include_tax: bool,
    /// Status of newly created products
    pub product_status: ProductStatus,
    /// Backorder policy of stock-managed products
    pub backorders: BackorderPolicy,
}

impl Default for ProductSyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            tag_filter: None,
            price_rate: None,
            sync_stock: true,
            import_categories: false,
            prices_include_tax: false,
            product_status: ProductStatus::Draft,
            backorders: BackorderPolicy::No,
        }
    }
}

/// How WooCommerce orders are exported to Holded.
#[derive(Debug, Clone)]
pub struct OrderExportConfig {
    /// Document type orders are exported as
    pub doc_type: DocumentType,
    /// Order status that triggers an export
    pub export_status: OrderStatus,
    /// Holded numbering series id
    pub series_id: Option<String>,
    /// Holded document design id
    pub design_id: Option<String>,
    /// Holded sales channel id
    pub sales_channel_id: Option<String>,
    /// Approve documents on creation
    pub approve: bool,
    /// Register the payment of paid orders
    pub mark_paid: bool,
    /// Export orders with a zero total
    pub sync_free: bool,
    /// Prefix of shipping line names
    pub shipping_label: String,
}

impl Default for OrderExportConfig {
    fn default() -> Self {
        Self {
            doc_type: DocumentType::Invoice,
            export_status: OrderStatus::Completed,
            series_id: None,
            design_id: None,
            sales_channel_id: None,
            approve: true,
            mark_paid: false,
            sync_free: false,
            shipping_label: "Shipping".to_string(),
        }
    }
}

/// Email (SMTP) configuration for the epoch summary.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
    /// Recipient of the sync summary
    pub report_to: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("report_to", &self.report_to)
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an in-memory map of variables.
    ///
    /// # Errors
    ///
    /// Same as [`SyncConfig::from_env`].
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env
            .optional("SYNC_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let host = env.parse_or("SYNC_HOST", "127.0.0.1".parse::<IpAddr>().ok())?;
        let port = env.parse_or("SYNC_PORT", Some(3002))?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host: host.unwrap_or(IpAddr::from([127, 0, 0, 1])),
            port: port.unwrap_or(3002),
            api_token: env.validated_secret("SYNC_API_TOKEN")?,
            woocommerce: WooCommerceConfig::from_env(&env)?,
            holded: HoldedConfig::from_env(&env)?,
            products: ProductSyncConfig::from_env(&env)?,
            orders: OrderExportConfig::from_env(&env)?,
            email: EmailConfig::from_env(&env)?,
            log_json: env.optional("SYNC_LOG_JSON").is_some(),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the email configuration (if configured).
    #[must_use]
    pub const fn email(&self) -> Option<&EmailConfig> {
        self.email.as_ref()
    }
}

impl WooCommerceConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let base_url = env.required("WOOCOMMERCE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("WOOCOMMERCE_URL".to_string(), e.to_string()))?;

        let webhook_secret = env.optional("WOOCOMMERCE_WEBHOOK_SECRET");
        if let Some(secret) = &webhook_secret
            && let Err(e) = validate_secret_strength(secret, "WOOCOMMERCE_WEBHOOK_SECRET")
        {
            tracing::warn!("WOOCOMMERCE_WEBHOOK_SECRET validation warning: {e}");
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            consumer_key: env.required("WOOCOMMERCE_CONSUMER_KEY")?,
            consumer_secret: env.validated_secret("WOOCOMMERCE_CONSUMER_SECRET")?,
            webhook_secret: webhook_secret.map(SecretString::from),
        })
    }
}

impl HoldedConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: env
                .or_default("HOLDED_API_URL", DEFAULT_HOLDED_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: env.validated_secret("HOLDED_API_KEY")?,
        })
    }
}

impl ProductSyncConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let batch_size = env
            .parse_or("SYNC_BATCH_SIZE", Some(defaults.batch_size))?
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "SYNC_BATCH_SIZE".to_string(),
                format!("must be between 1 and {MAX_BATCH_SIZE}"),
            ));
        }

        Ok(Self {
            batch_size,
            tag_filter: env.optional("SYNC_TAG_FILTER"),
            price_rate: env.optional("SYNC_PRICE_RATE"),
            sync_stock: env.flag("SYNC_STOCK", defaults.sync_stock)?,
            import_categories: env.flag("SYNC_CATEGORIES", defaults.import_categories)?,
            prices_include_tax: env.flag("SYNC_PRICES_INCLUDE_TAX", defaults.prices_include_tax)?,
            product_status: env
                .parse_or("SYNC_PRODUCT_STATUS", Some(defaults.product_status))?
                .unwrap_or_default(),
            backorders: env
                .parse_or("SYNC_BACKORDERS", Some(defaults.backorders))?
                .unwrap_or_default(),
        })
    }
}

impl OrderExportConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            doc_type: env
                .parse_or("ORDER_DOC_TYPE", Some(defaults.doc_type))?
                .unwrap_or_default(),
            export_status: env
                .parse_or("ORDER_EXPORT_STATUS", Some(defaults.export_status))?
                .unwrap_or(OrderStatus::Completed),
            series_id: env.optional("ORDER_SERIES_ID"),
            design_id: env.optional("ORDER_DESIGN_ID"),
            sales_channel_id: env.optional("ORDER_SALES_CHANNEL_ID"),
            approve: env.flag("ORDER_APPROVE", defaults.approve)?,
            mark_paid: env.flag("ORDER_MARK_PAID", defaults.mark_paid)?,
            sync_free: env.flag("ORDER_SYNC_FREE", defaults.sync_free)?,
            shipping_label: env.or_default("ORDER_SHIPPING_LABEL", &defaults.shipping_label),
        })
    }
}

impl EmailConfig {
    /// Returns `None` unless the whole SMTP group is set.
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let keys = [
            "SMTP_HOST",
            "SMTP_USERNAME",
            "SMTP_PASSWORD",
            "SMTP_FROM",
            "SYNC_REPORT_TO",
        ];
        let present = keys.iter().filter(|k| env.optional(k).is_some()).count();
        if present == 0 {
            return Ok(None);
        }
        if present != keys.len() {
            return Err(ConfigError::InvalidEnvVar(
                "SMTP_*".to_string(),
                format!("{} must be set together", keys.join(", ")),
            ));
        }

        Ok(Some(Self {
            smtp_host: env.required("SMTP_HOST")?,
            smtp_port: env.parse_or("SMTP_PORT", Some(587))?.unwrap_or(587),
            smtp_username: env.required("SMTP_USERNAME")?,
            smtp_password: SecretString::from(env.required("SMTP_PASSWORD")?),
            from_address: env.required("SMTP_FROM")?,
            report_to: env.required("SYNC_REPORT_TO")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the parsing helpers used by every section.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: Option<T>) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }

    /// Parse a boolean flag (`true/false`, `yes/no`, `1/0`, `on/off`).
    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(raw) = self.optional(key) else {
            return Ok(default);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got {other:?}"),
            )),
        }
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // API keys are random hex or base62; anything below this is hand-typed
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("SYNC_API_TOKEN", "q7Zp2LxV9mKc4RtW8bNf3HsJ6dGy1Ae5"),
            ("WOOCOMMERCE_URL", "https://shop.test/"),
            ("WOOCOMMERCE_CONSUMER_KEY", "ck_4f1d9a7c2e8b"),
            (
                "WOOCOMMERCE_CONSUMER_SECRET",
                "cs_9b3e7f1a5c2d8e4b6a0f3c7d1e9b5a2f",
            ),
            ("HOLDED_API_KEY", "8d2f6a1c9e4b7d3a5f0c2e8b6d1a9f4c"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_hex_key() {
        assert!(validate_secret_strength("8d2f6a1c9e4b7d3a5f0c2e8b6d1a9f4c", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let config = SyncConfig::from_map(&base_vars()).unwrap();
        assert_eq!(config.port, 3002);
        assert_eq!(config.woocommerce.base_url, "https://shop.test");
        assert_eq!(config.holded.api_url, DEFAULT_HOLDED_API_URL);
        assert_eq!(config.products.batch_size, 5);
        assert!(config.products.sync_stock);
        assert_eq!(config.orders.doc_type, DocumentType::Invoice);
        assert_eq!(config.orders.export_status, OrderStatus::Completed);
        assert!(config.email.is_none());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3002");
    }

    #[test]
    fn test_missing_required_var() {
        let mut vars = base_vars();
        vars.remove("HOLDED_API_KEY");
        let err = SyncConfig::from_map(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(k) if k == "HOLDED_API_KEY"));
    }

    #[test]
    fn test_batch_size_bounds() {
        let mut vars = base_vars();
        vars.insert("SYNC_BATCH_SIZE".to_string(), "0".to_string());
        assert!(SyncConfig::from_map(&vars).is_err());

        vars.insert("SYNC_BATCH_SIZE".to_string(), "25".to_string());
        assert_eq!(SyncConfig::from_map(&vars).unwrap().products.batch_size, 25);
    }

    #[test]
    fn test_flags_and_enums_parse() {
        let mut vars = base_vars();
        vars.insert("SYNC_STOCK".to_string(), "no".to_string());
        vars.insert("ORDER_DOC_TYPE".to_string(), "salesreceipt".to_string());
        vars.insert("ORDER_EXPORT_STATUS".to_string(), "wc-processing".to_string());
        vars.insert("SYNC_BACKORDERS".to_string(), "notify".to_string());
        let config = SyncConfig::from_map(&vars).unwrap();
        assert!(!config.products.sync_stock);
        assert_eq!(config.orders.doc_type, DocumentType::SalesReceipt);
        assert_eq!(config.orders.export_status, OrderStatus::Processing);
        assert_eq!(config.products.backorders, BackorderPolicy::Notify);

        vars.insert("SYNC_STOCK".to_string(), "maybe".to_string());
        assert!(SyncConfig::from_map(&vars).is_err());
    }

    #[test]
    fn test_partial_smtp_group_rejected() {
        let mut vars = base_vars();
        vars.insert("SMTP_HOST".to_string(), "smtp.test".to_string());
        assert!(SyncConfig::from_map(&vars).is_err());

        for (k, v) in [
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "pw"),
            ("SMTP_FROM", "sync@shop.test"),
            ("SYNC_REPORT_TO", "owner@shop.test"),
        ] {
            vars.insert(k.to_string(), v.to_string());
        }
        let email = SyncConfig::from_map(&vars).unwrap().email.unwrap();
        assert_eq!(email.smtp_port, 587);
        assert_eq!(email.report_to, "owner@shop.test");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = SyncConfig::from_map(&base_vars()).unwrap();
        let debug = format!("{:?}", config.holded);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("8d2f6a1c"));
    }
}
