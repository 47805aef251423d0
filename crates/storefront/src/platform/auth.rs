//! OAuth2 client credentials token for API calls.
//!
//! The token is fetched on first use and reused until shortly before it
//! expires. Only one fetch runs at a time.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

use super::PlatformError;
use super::errors::map_error_response;
use crate::config::{PlatformConfig, reveal};

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Absolute expiry for a token issued at `now` that lives `expires_in` seconds.
fn expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, PlatformError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            PlatformError::Parse(serde::de::Error::custom(format!(
                "token expires_in out of range: {expires_in}"
            )))
        })
}

/// Fetches and caches client credentials tokens.
pub struct TokenProvider {
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    current: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Build a provider from platform configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token URL cannot be derived.
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            token_url: config.token_url()?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scopes.join(" "),
            current: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, fetching a new one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the credentials or is
    /// unreachable.
    #[instrument(skip(self, http))]
    pub async fn bearer(&self, http: &reqwest::Client) -> Result<SecretString, PlatformError> {
        let mut current = self.current.lock().await;
        let now = Utc::now();

        if let Some(token) = current.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        debug!("Requesting client credentials token");
        let response = http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(reveal(&self.client_secret)))
            .form(&[("grant_type", "client_credentials"), ("scope", self.scope.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(map_error_response(status.as_u16(), &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let cached = CachedToken {
            expires_at: expiry(now, token.expires_in)?,
            value: SecretString::from(token.access_token),
        };
        let value = cached.value.clone();
        *current = Some(cached);
        Ok(value)
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness_honours_margin() {
        let now = Utc::now();
        let token = CachedToken {
            value: SecretString::from("t"),
            expires_at: now + Duration::seconds(EXPIRY_MARGIN_SECS + 5),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(10)));
    }

    #[test]
    fn test_token_response_parses() {
        let parsed: Result<TokenResponse, _> = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":172800,"scope":"p"}"#,
        );
        assert!(matches!(
            parsed,
            Ok(TokenResponse { ref access_token, expires_in: 172_800 }) if access_token == "abc"
        ));
    }

    #[test]
    fn test_expiry_rejects_out_of_range_lifetimes() {
        let now = Utc::now();
        assert!(matches!(expiry(now, 3600), Ok(at) if at == now + Duration::hours(1)));
        assert!(matches!(expiry(now, i64::MAX), Err(PlatformError::Parse(_))));
        assert!(matches!(expiry(now, i64::MIN), Err(PlatformError::Parse(_))));
        assert!(matches!(
            expiry(DateTime::<Utc>::MAX_UTC, 3600),
            Err(PlatformError::Parse(_))
        ));
    }
}
