//! Commerce platform REST API access.
//!
//! # Architecture
//!
//! - [`CommerceBackend`] is the seam every workflow talks to. It has one
//!   method per platform call the storefront makes and nothing else.
//! - [`PlatformClient`] implements it over HTTPS with `reqwest`, using a
//!   client credentials bearer token.
//! - The platform is the source of truth: nothing is cached locally, every
//!   mutation returns the full updated resource.
//! - Error bodies are mapped to [`PlatformError`] once, in [`errors`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cartline_storefront::platform::{CommerceBackend, PlatformClient};
//!
//! let client = PlatformClient::new(&config)?;
//! let cart = client.get_cart(&cart_id).await?;
//! ```

mod auth;
mod client;
pub mod errors;
pub mod types;

use std::future::Future;

pub use client::PlatformClient;
pub use types::*;

use cartline_core::{CartId, CustomerId};
use thiserror::Error;

/// Page size used when listing carts.
pub const CART_QUERY_LIMIT: u32 = 100;

/// Errors that can occur when interacting with the commerce platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The update carried a stale version.
    #[error("Version conflict (current version: {})", format_version(.current_version))]
    VersionConflict {
        /// Version the platform holds, when reported.
        current_version: Option<i64>,
    },

    /// The platform rejected the request body.
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    /// Sign-in with unknown email or wrong password.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Token missing, expired, or lacking scope.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Platform message.
        message: String,
    },
}

impl PlatformError {
    /// Whether this is the platform's answer to signing up with an email
    /// that already belongs to a customer.
    #[must_use]
    pub fn is_duplicate_email(&self) -> bool {
        matches!(
            self,
            Self::Validation(ValidationError::DuplicateField { field, .. }) if field == "email"
        )
    }
}

#[allow(clippy::ref_option)] // thiserror passes fields by reference
fn format_version(version: &Option<i64>) -> String {
    version.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

/// Request body rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A unique field already holds this value.
    #[error("duplicate value for field '{field}'")]
    DuplicateField {
        /// Field name, e.g. `email`.
        field: String,
        /// Rejected value, when reported.
        value: Option<String>,
    },

    /// A field is missing or malformed.
    #[error("{message}")]
    InvalidField {
        /// Field name, when reported.
        field: Option<String>,
        /// Platform message.
        message: String,
    },
}

/// The platform calls the storefront workflows depend on.
///
/// Implemented by [`PlatformClient`] for real traffic and by in-memory fakes
/// in tests.
pub trait CommerceBackend: Send + Sync {
    /// Create a cart.
    fn create_cart(
        &self,
        draft: &CartDraft,
    ) -> impl Future<Output = Result<Cart, PlatformError>> + Send;

    /// Fetch a cart by ID.
    fn get_cart(&self, id: &CartId) -> impl Future<Output = Result<Cart, PlatformError>> + Send;

    /// Fetch the active cart of a customer.
    fn get_cart_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> impl Future<Output = Result<Cart, PlatformError>> + Send;

    /// List carts, at most `limit` per page.
    fn query_carts(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<PagedQueryResponse<Cart>, PlatformError>> + Send;

    /// Apply update actions to a cart.
    fn update_cart(
        &self,
        id: &CartId,
        update: &CartUpdate,
    ) -> impl Future<Output = Result<Cart, PlatformError>> + Send;

    /// Sign a customer in, optionally merging an anonymous cart.
    fn sign_in(
        &self,
        request: &CustomerSignIn,
    ) -> impl Future<Output = Result<CustomerSignInResult, PlatformError>> + Send;

    /// Register a new customer.
    fn sign_up(
        &self,
        draft: &CustomerDraft,
    ) -> impl Future<Output = Result<CustomerSignInResult, PlatformError>> + Send;

    /// Fetch a customer by ID.
    fn get_customer(
        &self,
        id: &CustomerId,
    ) -> impl Future<Output = Result<Customer, PlatformError>> + Send;

    /// Apply update actions to a customer.
    fn update_customer(
        &self,
        id: &CustomerId,
        update: &CustomerUpdate,
    ) -> impl Future<Output = Result<Customer, PlatformError>> + Send;
}

impl<T: CommerceBackend> CommerceBackend for &T {
    fn create_cart(
        &self,
        draft: &CartDraft,
    ) -> impl Future<Output = Result<Cart, PlatformError>> + Send {
        (**self).create_cart(draft)
    }

    fn get_cart(&self, id: &CartId) -> impl Future<Output = Result<Cart, PlatformError>> + Send {
        (**self).get_cart(id)
    }

    fn get_cart_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> impl Future<Output = Result<Cart, PlatformError>> + Send {
        (**self).get_cart_by_customer(customer_id)
    }

    fn query_carts(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<PagedQueryResponse<Cart>, PlatformError>> + Send {
        (**self).query_carts(limit)
    }

    fn update_cart(
        &self,
        id: &CartId,
        update: &CartUpdate,
    ) -> impl Future<Output = Result<Cart, PlatformError>> + Send {
        (**self).update_cart(id, update)
    }

    fn sign_in(
        &self,
        request: &CustomerSignIn,
    ) -> impl Future<Output = Result<CustomerSignInResult, PlatformError>> + Send {
        (**self).sign_in(request)
    }

    fn sign_up(
        &self,
        draft: &CustomerDraft,
    ) -> impl Future<Output = Result<CustomerSignInResult, PlatformError>> + Send {
        (**self).sign_up(draft)
    }

    fn get_customer(
        &self,
        id: &CustomerId,
    ) -> impl Future<Output = Result<Customer, PlatformError>> + Send {
        (**self).get_customer(id)
    }

    fn update_customer(
        &self,
        id: &CustomerId,
        update: &CustomerUpdate,
    ) -> impl Future<Output = Result<Customer, PlatformError>> + Send {
        (**self).update_customer(id, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::NotFound("cart-123".to_string());
        assert_eq!(err.to_string(), "Not found: cart-123");

        let err = PlatformError::VersionConflict {
            current_version: Some(5),
        };
        assert_eq!(err.to_string(), "Version conflict (current version: 5)");

        let err = PlatformError::VersionConflict {
            current_version: None,
        };
        assert_eq!(err.to_string(), "Version conflict (current version: unknown)");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = PlatformError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_duplicate_email_only_for_email_field() {
        let email = PlatformError::Validation(ValidationError::DuplicateField {
            field: "email".to_string(),
            value: None,
        });
        let key = PlatformError::Validation(ValidationError::DuplicateField {
            field: "key".to_string(),
            value: None,
        });
        assert!(email.is_duplicate_email());
        assert!(!key.is_duplicate_email());
        assert!(!PlatformError::RateLimited(1).is_duplicate_email());
    }
}
