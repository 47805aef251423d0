//! Sign-up result handling.

use tracing::{info, warn};

use crate::models::{Page, storage_keys};
use crate::platform::{Customer, CustomerSignInResult, PlatformError};
use crate::storage::{KeyValueStore, StorageError};
use crate::view::RegistrationView;

/// Shown after a successful sign-up.
pub const SUCCESS_MESSAGE: &str = "Account created successfully! 🎉";

/// Shown when sign-up fails for any reason but a taken email.
pub const FAILURE_MESSAGE: &str = "Something went wrong, try again later :)";

/// What a sign-up attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The customer exists now.
    Created(Box<Customer>),
    /// Another customer already uses the email.
    EmailTaken,
    /// Anything else went wrong.
    Failed,
}

impl RegistrationOutcome {
    /// Classify a sign-up result.
    #[must_use]
    pub fn classify(result: &Result<CustomerSignInResult, PlatformError>) -> Self {
        match result {
            Ok(signed_up) => Self::Created(Box::new(signed_up.customer.clone())),
            Err(e) if e.is_duplicate_email() => Self::EmailTaken,
            Err(_) => Self::Failed,
        }
    }

    /// The created customer, if any.
    #[must_use]
    pub fn customer(&self) -> Option<&Customer> {
        match self {
            Self::Created(customer) => Some(customer),
            Self::EmailTaken | Self::Failed => None,
        }
    }

    /// Drive the view and storage for this outcome.
    ///
    /// On success the chosen password is stored for later cart merging.
    ///
    /// # Errors
    ///
    /// Returns an error if the password cannot be stored. The view has not
    /// been touched in that case.
    pub fn apply(
        &self,
        store: &impl KeyValueStore,
        password: &str,
        view: &mut impl RegistrationView,
    ) -> Result<(), StorageError> {
        match self {
            Self::Created(customer) => {
                store.set(storage_keys::PASSWORD, password)?;
                view.show_message(SUCCESS_MESSAGE);
                view.show_overlay();
                view.set_email_invalid(false);
                view.navigate(Page::Overview);
                info!(customer_id = %customer.id, "Customer registered");
            }
            Self::EmailTaken => {
                view.show_email_taken();
                view.set_email_invalid(true);
                info!("Registration rejected, email already in use");
            }
            Self::Failed => {
                view.show_message(FAILURE_MESSAGE);
                view.show_overlay();
                warn!("Registration failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartline_core::CustomerId;

    use super::*;
    use crate::platform::ValidationError;
    use crate::storage::MemoryStore;

    #[derive(Debug, Default)]
    struct Calls(Vec<String>);

    impl RegistrationView for Calls {
        fn show_message(&mut self, message: &str) {
            self.0.push(format!("message:{message}"));
        }

        fn show_overlay(&mut self) {
            self.0.push("overlay".to_string());
        }

        fn show_email_taken(&mut self) {
            self.0.push("email_taken".to_string());
        }

        fn set_email_invalid(&mut self, invalid: bool) {
            self.0.push(format!("email_invalid:{invalid}"));
        }

        fn navigate(&mut self, page: Page) {
            self.0.push(format!("navigate:{page}"));
        }
    }

    fn signed_up() -> CustomerSignInResult {
        CustomerSignInResult {
            customer: Customer {
                id: CustomerId::new("c-1"),
                version: 1,
                email: "jane@example.com".to_string(),
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                addresses: Vec::new(),
                default_shipping_address_id: None,
                default_billing_address_id: None,
            },
            cart: None,
        }
    }

    fn duplicate_email() -> PlatformError {
        PlatformError::Validation(ValidationError::DuplicateField {
            field: "email".to_string(),
            value: Some("jane@example.com".to_string()),
        })
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            RegistrationOutcome::classify(&Ok(signed_up())),
            RegistrationOutcome::Created(_)
        ));
        assert_eq!(
            RegistrationOutcome::classify(&Err(duplicate_email())),
            RegistrationOutcome::EmailTaken
        );
        assert_eq!(
            RegistrationOutcome::classify(&Err(PlatformError::RateLimited(2))),
            RegistrationOutcome::Failed
        );
    }

    #[test]
    fn test_created_stores_password_and_navigates_once() {
        let store = MemoryStore::new();
        let mut view = Calls::default();

        RegistrationOutcome::classify(&Ok(signed_up()))
            .apply(&store, "Secret#123", &mut view)
            .unwrap();

        assert_eq!(
            store.get(storage_keys::PASSWORD).unwrap().as_deref(),
            Some("Secret#123")
        );
        assert_eq!(
            view.0,
            vec![
                format!("message:{SUCCESS_MESSAGE}"),
                "overlay".to_string(),
                "email_invalid:false".to_string(),
                "navigate:/overview".to_string(),
            ]
        );
    }

    #[test]
    fn test_email_taken_skips_generic_panel() {
        let store = MemoryStore::new();
        let mut view = Calls::default();

        RegistrationOutcome::EmailTaken
            .apply(&store, "Secret#123", &mut view)
            .unwrap();

        assert_eq!(view.0, vec!["email_taken", "email_invalid:true"]);
        assert!(store.get(storage_keys::PASSWORD).unwrap().is_none());
    }

    #[test]
    fn test_failed_shows_generic_message() {
        let store = MemoryStore::new();
        let mut view = Calls::default();

        RegistrationOutcome::Failed
            .apply(&store, "Secret#123", &mut view)
            .unwrap();

        assert_eq!(
            view.0,
            vec![format!("message:{FAILURE_MESSAGE}"), "overlay".to_string()]
        );
    }
}
