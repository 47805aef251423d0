//! Platform configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COMMERCE_PROJECT_KEY` - Project key on the commerce platform
//! - `COMMERCE_CLIENT_ID` - API client ID (client credentials flow)
//! - `COMMERCE_CLIENT_SECRET` - API client secret
//!
//! ## Optional
//! - `COMMERCE_API_URL` - API host (default: europe-west1 GCP region)
//! - `COMMERCE_AUTH_URL` - OAuth host (default: europe-west1 GCP region)
//! - `COMMERCE_SCOPES` - Space-separated OAuth scopes (default: `manage_project:{project_key}`)
//! - `CART_DISCOUNT_CODE` - Discount code used when none is given (default: emp15)

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Default API host.
pub const DEFAULT_API_URL: &str = "https://api.europe-west1.gcp.commercetools.com";

/// Default OAuth host.
pub const DEFAULT_AUTH_URL: &str = "https://auth.europe-west1.gcp.commercetools.com";

/// Discount code applied when the caller does not name one.
pub const DEFAULT_DISCOUNT_CODE: &str = "emp15";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Commerce platform API configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct PlatformConfig {
    /// API host, e.g. `https://api.europe-west1.gcp.commercetools.com`
    pub api_url: Url,
    /// OAuth host, e.g. `https://auth.europe-west1.gcp.commercetools.com`
    pub auth_url: Url,
    /// Project key (first path segment of every API call)
    pub project_key: String,
    /// API client ID
    pub client_id: String,
    /// API client secret
    pub client_secret: SecretString,
    /// OAuth scopes requested with the client credentials grant
    pub scopes: Vec<String>,
    /// Cart defaults
    pub cart: CartSettings,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_url", &self.api_url.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("project_key", &self.project_key)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("cart", &self.cart)
            .finish()
    }
}

/// Settings the cart gateway reads when building requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Discount code used by `add_discount_code(None)`.
    pub default_discount_code: String,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            default_discount_code: DEFAULT_DISCOUNT_CODE.to_string(),
        }
    }
}

impl PlatformConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, URLs do not
    /// parse, or the client secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let project_key = get_required_env("COMMERCE_PROJECT_KEY")?;
        let api_url = get_url("COMMERCE_API_URL", DEFAULT_API_URL)?;
        let auth_url = get_url("COMMERCE_AUTH_URL", DEFAULT_AUTH_URL)?;
        let client_id = get_required_env("COMMERCE_CLIENT_ID")?;
        let client_secret = get_validated_secret("COMMERCE_CLIENT_SECRET")?;
        let scopes = get_optional_env("COMMERCE_SCOPES").map_or_else(
            || vec![format!("manage_project:{project_key}")],
            |raw| parse_scopes(&raw),
        );
        let cart = CartSettings {
            default_discount_code: get_env_or_default("CART_DISCOUNT_CODE", DEFAULT_DISCOUNT_CODE),
        };

        Ok(Self {
            api_url,
            auth_url,
            project_key,
            client_id,
            client_secret,
            scopes,
            cart,
        })
    }

    /// Base URL for project-scoped API calls (`{api_url}/{project_key}/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the project key produces an invalid URL.
    pub fn project_url(&self) -> Result<Url, url::ParseError> {
        self.api_url.join(&format!("{}/", self.project_key))
    }

    /// OAuth token endpoint (`{auth_url}/oauth/token`).
    ///
    /// # Errors
    ///
    /// Returns an error if the auth URL cannot be joined.
    pub fn token_url(&self) -> Result<Url, url::ParseError> {
        self.auth_url.join("oauth/token")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a URL variable, falling back to `default`.
fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(key, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a space- or comma-separated scope list.
fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the secret from the API client page."
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

/// Expose a secret for a request header or form body.
pub(crate) fn reveal(secret: &SecretString) -> &str {
    secret.expose_secret()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_config() -> PlatformConfig {
        PlatformConfig {
            api_url: Url::parse(DEFAULT_API_URL).unwrap(),
            auth_url: Url::parse(DEFAULT_AUTH_URL).unwrap(),
            project_key: "ecommerce-app".to_string(),
            client_id: "client_id_value".to_string(),
            client_secret: SecretString::from("q8Zr-2mX_vK4pL9sT1wY6nB3"),
            scopes: vec!["manage_project:ecommerce-app".to_string()],
            cart: CartSettings::default(),
        }
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
        let err = validate_secret_strength("your-client-secret", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("q8Zr-2mX_vK4pL9sT1wY6nB3", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_scopes_accepts_spaces_and_commas() {
        assert_eq!(
            parse_scopes("view_products:p, manage_my_orders:p  manage_customers:p"),
            vec![
                "view_products:p".to_string(),
                "manage_my_orders:p".to_string(),
                "manage_customers:p".to_string(),
            ]
        );
    }

    #[test]
    fn test_project_and_token_urls() {
        let config = sample_config();
        assert_eq!(
            config.project_url().unwrap().as_str(),
            "https://api.europe-west1.gcp.commercetools.com/ecommerce-app/"
        );
        assert_eq!(
            config.token_url().unwrap().as_str(),
            "https://auth.europe-west1.gcp.commercetools.com/oauth/token"
        );
    }

    #[test]
    fn test_default_discount_code() {
        assert_eq!(CartSettings::default().default_discount_code, "emp15");
    }

    #[test]
    fn test_platform_config_debug_redacts_secret() {
        let debug_output = format!("{:?}", sample_config());

        assert!(debug_output.contains("ecommerce-app"));
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("q8Zr-2mX_vK4pL9sT1wY6nB3"));
    }
}
