//! HTTP implementation of [`CommerceBackend`].

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use cartline_core::{CartId, CustomerId};

use super::auth::TokenProvider;
use super::errors::map_error_response;
use super::types::{
    Cart, CartDraft, CartUpdate, Customer, CustomerDraft, CustomerSignIn, CustomerSignInResult,
    CustomerUpdate, PagedQueryResponse,
};
use super::{CommerceBackend, PlatformError};
use crate::config::{PlatformConfig, reveal};

/// Client for the commerce platform REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the token.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    http: reqwest::Client,
    project_url: Url,
    tokens: TokenProvider,
}

impl PlatformClient {
    /// Create a new platform client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URLs are unusable or the HTTP
    /// client fails to build.
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cartline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(PlatformClientInner {
                http,
                project_url: config.project_url()?,
                tokens: TokenProvider::new(config)?,
            }),
        })
    }

    /// Resolve a path relative to the project URL.
    fn url(&self, path: &str) -> Result<Url, PlatformError> {
        Ok(self.inner.project_url.join(path)?)
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, PlatformError> {
        let token = self.inner.tokens.bearer(&self.inner.http).await?;

        let mut request: RequestBuilder = self
            .inner
            .http
            .request(method, url)
            .bearer_auth(reveal(&token));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PlatformError::RateLimited(retry_after));
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.inner.tokens.invalidate().await;
            }
            tracing::warn!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Platform API returned non-success status"
            );
            return Err(map_error_response(status.as_u16(), &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse platform response"
            );
            PlatformError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, PlatformError> {
        self.execute(Method::GET, url, None::<&()>).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, PlatformError> {
        self.execute(Method::POST, url, Some(body)).await
    }
}

impl CommerceBackend for PlatformClient {
    #[instrument(skip(self, draft), fields(customer_id = ?draft.customer_id))]
    async fn create_cart(&self, draft: &CartDraft) -> Result<Cart, PlatformError> {
        let cart: Cart = self.post(self.url("carts")?, draft).await?;
        debug!(cart_id = %cart.id, "Cart created");
        Ok(cart)
    }

    #[instrument(skip(self), fields(cart_id = %id))]
    async fn get_cart(&self, id: &CartId) -> Result<Cart, PlatformError> {
        self.get(self.url(&format!("carts/{id}"))?).await
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn get_cart_by_customer(&self, customer_id: &CustomerId) -> Result<Cart, PlatformError> {
        self.get(self.url(&format!("carts/customer-id={customer_id}"))?)
            .await
    }

    #[instrument(skip(self))]
    async fn query_carts(&self, limit: u32) -> Result<PagedQueryResponse<Cart>, PlatformError> {
        let mut url = self.url("carts")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.get(url).await
    }

    #[instrument(
        skip(self, update),
        fields(cart_id = %id, version = update.version, actions = update.actions.len())
    )]
    async fn update_cart(&self, id: &CartId, update: &CartUpdate) -> Result<Cart, PlatformError> {
        self.post(self.url(&format!("carts/{id}"))?, update).await
    }

    #[instrument(skip(self, request), fields(mode = ?request.active_cart_sign_in_mode))]
    async fn sign_in(
        &self,
        request: &CustomerSignIn,
    ) -> Result<CustomerSignInResult, PlatformError> {
        self.post(self.url("login")?, request).await
    }

    #[instrument(skip(self, draft))]
    async fn sign_up(&self, draft: &CustomerDraft) -> Result<CustomerSignInResult, PlatformError> {
        self.post(self.url("customers")?, draft).await
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_customer(&self, id: &CustomerId) -> Result<Customer, PlatformError> {
        self.get(self.url(&format!("customers/{id}"))?).await
    }

    #[instrument(skip(self, update), fields(customer_id = %id, version = update.version))]
    async fn update_customer(
        &self,
        id: &CustomerId,
        update: &CustomerUpdate,
    ) -> Result<Customer, PlatformError> {
        self.post(self.url(&format!("customers/{id}"))?, update)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::CartSettings;

    fn client() -> PlatformClient {
        PlatformClient::new(&PlatformConfig {
            api_url: Url::parse("https://api.example.test").unwrap(),
            auth_url: Url::parse("https://auth.example.test").unwrap(),
            project_key: "shop".to_string(),
            client_id: "id".to_string(),
            client_secret: SecretString::from("q8Zr-2mX_vK4pL9sT1wY6nB3"),
            scopes: vec!["manage_project:shop".to_string()],
            cart: CartSettings::default(),
        })
        .unwrap()
    }

    #[test]
    fn test_urls_are_project_scoped() {
        let client = client();
        assert_eq!(
            client.url("carts/abc").unwrap().as_str(),
            "https://api.example.test/shop/carts/abc"
        );
        assert_eq!(
            client.url("carts/customer-id=c-1").unwrap().as_str(),
            "https://api.example.test/shop/carts/customer-id=c-1"
        );
        assert_eq!(
            client.url("login").unwrap().as_str(),
            "https://api.example.test/shop/login"
        );
    }
}
