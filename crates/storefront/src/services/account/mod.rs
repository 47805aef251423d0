//! Customer account workflows: registration, sign-in and default addresses.

pub mod addresses;
pub mod registration;

pub use addresses::{CheckboxState, DefaultAddressDecision, resolve_defaults};
pub use registration::{FAILURE_MESSAGE, RegistrationOutcome, SUCCESS_MESSAGE};

use secrecy::SecretString;
use tracing::{debug, info, instrument};

use cartline_core::{CustomerId, Email};

use crate::error::{Error, Result};
use crate::models::{CustomerSession, storage_keys};
use crate::platform::{
    ActiveCartSignInMode, CommerceBackend, Customer, CustomerDraft, CustomerSignIn, CustomerUpdate,
};
use crate::state::Session;
use crate::storage::KeyValueStore;
use crate::view::RegistrationView;

/// Account service over a platform backend and a key/value store.
pub struct AccountService<B, S> {
    backend: B,
    store: S,
}

impl<B: CommerceBackend, S: KeyValueStore> AccountService<B, S> {
    /// Create a new account service.
    pub const fn new(backend: B, store: S) -> Self {
        Self { backend, store }
    }

    /// The platform backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The key/value store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Sign a customer up and report the result through `view`.
    ///
    /// Platform failures are not errors here: they become
    /// [`RegistrationOutcome::EmailTaken`] or [`RegistrationOutcome::Failed`]
    /// and are shown to the shopper. On success the customer becomes the
    /// session customer and the checkboxes are applied to the new account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the draft is rejected before
    /// sending, [`Error::MissingAddress`] if the checkboxes name an address
    /// the draft lacks (nothing is sent), or an error if storage or the
    /// default-address update fails after the account was created.
    #[instrument(skip(self, session, draft, view), fields(email = %draft.email))]
    pub async fn register(
        &self,
        session: &mut Session,
        draft: &CustomerDraft,
        checkboxes: CheckboxState,
        view: &mut impl RegistrationView,
    ) -> Result<RegistrationOutcome> {
        draft.validate()?;
        resolve_defaults(checkboxes).check_addresses(draft.addresses.len())?;

        let result = self.backend.sign_up(draft).await;
        let outcome = RegistrationOutcome::classify(&result);
        outcome.apply(&self.store, &draft.password, view)?;

        if let Some(customer) = outcome.customer() {
            let email = Email::parse(&customer.email)
                .map_err(|e| Error::InvalidInput(format!("email: {e}")))?;
            let signed_in = CustomerSession {
                id: customer.id.clone(),
                email,
                password: Some(SecretString::from(draft.password.clone())),
            };
            signed_in.persist(&self.store)?;
            session.set_customer(Some(signed_in));

            self.apply_default_addresses(&customer.id, checkboxes).await?;
        }

        Ok(outcome)
    }

    /// Sign an existing customer in and make them the session customer.
    ///
    /// The platform attaches the customer's active cart, which becomes the
    /// session cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a malformed email, or the
    /// platform error (`InvalidCredentials` for a wrong password).
    #[instrument(skip(self, session, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<Customer> {
        let email = Email::parse(email).map_err(|e| Error::InvalidInput(format!("email: {e}")))?;
        let request = CustomerSignIn {
            email: email.as_str().to_string(),
            password: password.to_string(),
            anonymous_cart_id: None,
            active_cart_sign_in_mode: ActiveCartSignInMode::default(),
        };
        let result = self.backend.sign_in(&request).await?;

        let signed_in = CustomerSession {
            id: result.customer.id.clone(),
            email,
            password: Some(SecretString::from(password.to_string())),
        };
        signed_in.persist(&self.store)?;
        self.store.set(storage_keys::PASSWORD, password)?;
        session.set_customer(Some(signed_in));

        if let Some(cart) = result.cart {
            self.store.set(storage_keys::CART_ID, cart.id.as_str())?;
            session.replace_cart(cart);
        }
        info!(customer_id = %result.customer.id, "Customer signed in");
        Ok(result.customer)
    }

    /// Forget the signed-in customer and their cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn sign_out(&self, session: &mut Session) -> Result<()> {
        for key in [
            storage_keys::TOKEN_STORE,
            storage_keys::CUSTOMER_ID,
            storage_keys::EMAIL,
            storage_keys::PASSWORD,
            storage_keys::CART_ID,
        ] {
            self.store.remove(key)?;
        }
        *session = Session::new();
        info!("Customer signed out");
        Ok(())
    }

    /// Set the customer's default addresses from the registration
    /// checkboxes.
    ///
    /// Returns the updated customer, or `None` when the checkboxes ask for
    /// no change and nothing was sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] if a needed address does not exist,
    /// or the platform error.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn apply_default_addresses(
        &self,
        customer_id: &CustomerId,
        checkboxes: CheckboxState,
    ) -> Result<Option<Customer>> {
        let decision = resolve_defaults(checkboxes);
        if decision == DefaultAddressDecision::NoChange {
            debug!("Default addresses left unchanged");
            return Ok(None);
        }

        let customer = self.backend.get_customer(customer_id).await?;
        let update = CustomerUpdate {
            version: customer.version,
            actions: decision.actions(&customer)?,
        };
        let updated = self.backend.update_customer(customer_id, &update).await?;

        info!(?decision, version = updated.version, "Default addresses set");
        Ok(Some(updated))
    }
}
