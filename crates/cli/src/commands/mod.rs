//! Command implementations.
//!
//! # Environment Variables
//!
//! - `COMMERCE_PROJECT_KEY`, `COMMERCE_CLIENT_ID`, `COMMERCE_CLIENT_SECRET` -
//!   API client credentials (required)
//! - `COMMERCE_API_URL`, `COMMERCE_AUTH_URL` - Region hosts
//! - `CART_DISCOUNT_CODE` - Code applied by `cart discount` without argument

pub mod account;
pub mod cart;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use cartline_core::UnknownCountry;
use cartline_storefront::config::{ConfigError, PlatformConfig};
use cartline_storefront::models::CustomerSession;
use cartline_storefront::platform::{PlatformClient, PlatformError};
use cartline_storefront::services::{AccountService, CartGateway};
use cartline_storefront::state::Session;
use cartline_storefront::storage::{FileStore, StorageError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Platform client could not be built or a call failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// State file could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A workflow failed.
    #[error(transparent)]
    Storefront(#[from] cartline_storefront::Error),

    /// Country argument is not supported.
    #[error(transparent)]
    Country(#[from] UnknownCountry),

    /// The command needs a signed-in customer.
    #[error("No customer is signed in; run `cartline account login` first")]
    NotSignedIn,

    /// Registration was answered but did not create an account.
    #[error("Registration did not complete")]
    RegistrationRejected,
}

/// Everything a command needs: workflows over one platform client and one
/// state file, plus the session restored from that file.
pub struct Context {
    pub gateway: CartGateway<PlatformClient, Arc<FileStore>>,
    pub accounts: AccountService<PlatformClient, Arc<FileStore>>,
    pub session: Session,
}

impl Context {
    /// Build the context from the environment and the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the state file is
    /// unreadable.
    pub fn load(state_file: PathBuf) -> Result<Self, CommandError> {
        let config = PlatformConfig::from_env()?;
        let client = PlatformClient::new(&config)?;
        let store = Arc::new(FileStore::new(state_file));

        let session = CustomerSession::restore(&*store)?
            .map_or_else(Session::new, Session::for_customer);
        debug!(
            state_file = %store.path().display(),
            signed_in = session.customer().is_some(),
            "Context loaded"
        );

        Ok(Self {
            gateway: CartGateway::new(client.clone(), Arc::clone(&store), config.cart.clone()),
            accounts: AccountService::new(client, store),
            session,
        })
    }
}
