//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FGS_JWT_SECRET` - Admin token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `FGS_DATABASE_URL` - SQLite URL (falls back to `DATABASE_URL`, then `sqlite://fgs.db`)
//! - `FGS_HOST` - Bind address (default: 127.0.0.1)
//! - `FGS_PORT` - Listen port (default: 5000)
//! - `FGS_TOKEN_TTL_HOURS` - Admin token lifetime (default: 24)
//! - `FGS_PAYMENT_BANK_ACCOUNT` - Bank account shown when the setting is absent
//! - `FGS_PAYMENT_PROMPTPAY_ID` - `PromptPay` ID shown when the setting is absent
//! - `FGS_PAYMENT_LINE_ID` - LINE handle shown when the setting is absent
//! - `FGS_STATS_UTC_OFFSET` - Offset defining "today" for dashboard stats (default: +07:00)
//! - `FGS_CORS_ORIGIN` - Single origin allowed to call the API cross-site
//! - `FGS_RATE_LIMIT` - Per-IP rate limiting on/off (default: true)
//! - `FGS_LOG_JSON` - Emit JSON logs when set
//! - `FGS_BOOTSTRAP_ADMIN_USERNAME` / `FGS_BOOTSTRAP_ADMIN_PASSWORD` /
//!   `FGS_BOOTSTRAP_ADMIN_EMAIL` - First admin created when none exists
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::{FixedOffset, Offset, Utc};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_DATABASE_URL: &str = "sqlite://fgs.db";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Admin token settings
    pub auth: AuthConfig,
    /// Payment instructions used when the settings table has no value
    pub payment: PaymentDefaults,
    /// Offset whose calendar day counts as "today" in dashboard stats
    pub stats_offset: FixedOffset,
    /// Origin allowed by CORS, if any
    pub cors_origin: Option<String>,
    /// Whether per-IP rate limiting is applied
    pub rate_limit: bool,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Admin account created on startup when the table is empty
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Admin token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: SecretString,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Fallback payment instructions.
#[derive(Debug, Clone, Default)]
pub struct PaymentDefaults {
    pub bank_account: Option<String>,
    pub promptpay_id: Option<String>,
    pub line_id: Option<String>,
}

/// First admin account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: SecretString,
    pub email: Option<String>,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

impl ServerConfig {
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

        let database_url = get_database_url("FGS_DATABASE_URL");
        let host = parse_env("FGS_HOST", "127.0.0.1")?;
        let port = parse_env("FGS_PORT", "5000")?;
        let auth = AuthConfig::from_env()?;
        let payment = PaymentDefaults::from_env();
        let stats_offset = parse_utc_offset(&get_env_or_default("FGS_STATS_UTC_OFFSET", "+07:00"))
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "FGS_STATS_UTC_OFFSET".to_string(),
                    "expected an offset like +07:00".to_string(),
                )
            })?;
        let cors_origin = get_optional_env("FGS_CORS_ORIGIN");
        let rate_limit = parse_env("FGS_RATE_LIMIT", "true")?;
        let log_json = get_optional_env("FGS_LOG_JSON").is_some();
        let bootstrap_admin = BootstrapAdmin::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            auth,
            payment,
            stats_offset,
            cors_origin,
            rate_limit,
            log_json,
            bootstrap_admin,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for tests and tools: in-process defaults plus the given
    /// database URL and signing secret. No environment is read.
    #[must_use]
    pub fn for_database(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            database_url: SecretString::from(database_url.to_owned()),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            auth: AuthConfig {
                jwt_secret: SecretString::from(jwt_secret.to_owned()),
                token_ttl_hours: 24,
            },
            payment: PaymentDefaults::default(),
            stats_offset: bangkok_offset(),
            cors_origin: None,
            rate_limit: false,
            log_json: false,
            bootstrap_admin: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_validated_secret("FGS_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "FGS_JWT_SECRET")?;
        let token_ttl_hours: i64 = parse_env("FGS_TOKEN_TTL_HOURS", "24")?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FGS_TOKEN_TTL_HOURS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            jwt_secret,
            token_ttl_hours,
        })
    }
}

impl PaymentDefaults {
    fn from_env() -> Self {
        Self {
            bank_account: get_optional_env("FGS_PAYMENT_BANK_ACCOUNT"),
            promptpay_id: get_optional_env("FGS_PAYMENT_PROMPTPAY_ID"),
            line_id: get_optional_env("FGS_PAYMENT_LINE_ID"),
        }
    }
}

impl BootstrapAdmin {
    fn from_env() -> Option<Self> {
        let username = get_optional_env("FGS_BOOTSTRAP_ADMIN_USERNAME")?;
        let password = get_optional_env("FGS_BOOTSTRAP_ADMIN_PASSWORD")?;
        Some(Self {
            username,
            password: SecretString::from(password),
            email: get_optional_env("FGS_BOOTSTRAP_ADMIN_EMAIL"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`, then the local default.
/// Database URL from `FGS_DATABASE_URL`, then `DATABASE_URL`, then the default.
///
/// Tools that only touch the database use this instead of [`ServerConfig::from_env`],
/// which also requires the signing secret.
#[must_use]
pub fn database_url_from_env() -> SecretString {
    let _ = dotenvy::dotenv();
    get_database_url("FGS_DATABASE_URL")
}

fn get_database_url(primary_key: &str) -> SecretString {
    let value = std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    SecretString::from(value)
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse `+HH:MM` / `-HH:MM` into a fixed offset.
fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, value.get(1..)?),
        b'-' => (-1, value.get(1..)?),
        _ => (1, value),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// UTC+07:00, the store's trading time zone.
fn bangkok_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
