//! Unified error type for the storefront workflows.
//!
//! Platform failures keep their [`PlatformError`] classification so callers
//! can tell a stale cart version from a duplicate email without looking at
//! message text.

use thiserror::Error;

use crate::platform::PlatformError;
use crate::storage::StorageError;

/// Errors returned by the cart and account workflows.
#[derive(Debug, Error)]
pub enum Error {
    /// Platform call failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation needs a cart and none exists.
    #[error("No active cart")]
    NoActiveCart,

    /// The operation needs a signed-in customer.
    #[error("No customer is signed in")]
    NotSignedIn,

    /// Cart merge needs the stored password and there is none.
    #[error("No stored password for the signed-in customer")]
    MissingPassword,

    /// A default-address decision refers to an address the customer lacks.
    #[error("Customer has no address at index {index}")]
    MissingAddress {
        /// Zero-based address index.
        index: usize,
    },

    /// Input rejected before any platform call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the platform rejected the call because of a stale version.
    #[must_use]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::Platform(PlatformError::VersionConflict { .. }))
    }
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
