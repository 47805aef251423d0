//! Signed-in customer identity and the storage keys it is persisted under.

use secrecy::SecretString;

use cartline_core::{CustomerId, Email};

use crate::storage::{KeyValueStore, StorageError};

/// The customer the session acts for.
///
/// The password is kept so that signing in again with
/// `MergeWithExistingCustomerCart` can fold an anonymous cart into the
/// customer's cart.
#[derive(Debug, Clone)]
pub struct CustomerSession {
    /// Customer ID.
    pub id: CustomerId,
    /// Sign-in email.
    pub email: Email,
    /// Password, when known.
    pub password: Option<SecretString>,
}

impl CustomerSession {
    /// Restore the customer from storage.
    ///
    /// Returns `None` unless both the customer ID and a valid email are
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn restore(store: &impl KeyValueStore) -> Result<Option<Self>, StorageError> {
        let Some(id) = store.get(storage_keys::CUSTOMER_ID)? else {
            return Ok(None);
        };
        let Some(email) = store
            .get(storage_keys::EMAIL)?
            .and_then(|raw| Email::parse(&raw).ok())
        else {
            return Ok(None);
        };
        let password = store.get(storage_keys::PASSWORD)?.map(SecretString::from);

        Ok(Some(Self {
            id: CustomerId::new(id),
            email,
            password,
        }))
    }

    /// Persist the customer identity and set the token flag.
    ///
    /// The password is not written here; registration stores it separately.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn persist(&self, store: &impl KeyValueStore) -> Result<(), StorageError> {
        store.set(storage_keys::CUSTOMER_ID, self.id.as_str())?;
        store.set(storage_keys::EMAIL, self.email.as_str())?;
        store.set(storage_keys::TOKEN_STORE, "1")
    }
}

/// Storage keys shared by the workflows.
pub mod storage_keys {
    /// Present while a customer is signed in.
    pub const TOKEN_STORE: &str = "token_store";

    /// ID of the cart the shopper is filling.
    pub const CART_ID: &str = "cartID";

    /// Password chosen at registration, reused for cart merging.
    pub const PASSWORD: &str = "password";

    /// ID of the signed-in customer.
    pub const CUSTOMER_ID: &str = "customerID";

    /// Email of the signed-in customer.
    pub const EMAIL: &str = "email";
}
