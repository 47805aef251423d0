//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! cartline account register -e jane@example.com -p 'Secret#123' \
//!     --first-name Jane --last-name Doe --street "1 Main St" --ship-default
//! cartline account login -e jane@example.com -p 'Secret#123'
//! cartline account defaults --ship-default --separate-billing --bill-default
//! cartline account logout
//! ```

use tracing::{info, warn};

use cartline_core::{CountryCode, CustomerId};
use cartline_storefront::platform::{Address, CustomerDraft};
use cartline_storefront::services::account::{CheckboxState, RegistrationOutcome};

use super::{CommandError, Context};
use crate::view::TerminalView;

/// One address block of the registration form.
pub struct AddressFields {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
}

impl AddressFields {
    /// The address, or `None` when no field was filled in.
    fn into_address(self) -> Result<Option<Address>, CommandError> {
        if self.street.is_none() && self.city.is_none() && self.postal_code.is_none() {
            return Ok(None);
        }
        let country: CountryCode = self.country.parse()?;
        Ok(Some(Address {
            id: None,
            street_name: self.street,
            city: self.city,
            postal_code: self.postal_code,
            country,
        }))
    }
}

/// The registration form.
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub shipping: AddressFields,
    pub billing: AddressFields,
    pub checkboxes: CheckboxState,
}

impl RegistrationForm {
    /// Shipping address first, then billing when it differs.
    fn into_draft(self) -> Result<(CustomerDraft, CheckboxState), CommandError> {
        let mut addresses = Vec::with_capacity(2);
        addresses.extend(self.shipping.into_address()?);
        if !self.checkboxes.ship_as_bill {
            addresses.extend(self.billing.into_address()?);
        }

        let draft = CustomerDraft {
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            addresses,
        };
        Ok((draft, self.checkboxes))
    }
}

/// Create an account.
pub async fn register(ctx: &mut Context, form: RegistrationForm) -> Result<(), CommandError> {
    let (draft, checkboxes) = form.into_draft()?;
    let mut view = TerminalView::default();

    let outcome = ctx
        .accounts
        .register(&mut ctx.session, &draft, checkboxes, &mut view)
        .await?;

    match outcome {
        RegistrationOutcome::Created(customer) => {
            info!(customer_id = %customer.id, email = %customer.email, "Signed in");
            Ok(())
        }
        RegistrationOutcome::EmailTaken | RegistrationOutcome::Failed => {
            if view.email_invalid() {
                warn!(email = %draft.email, "Email field rejected");
            }
            Err(CommandError::RegistrationRejected)
        }
    }
}

/// Sign in.
pub async fn login(ctx: &mut Context, email: &str, password: &str) -> Result<(), CommandError> {
    let customer = ctx
        .accounts
        .sign_in(&mut ctx.session, email, password)
        .await?;
    info!(
        customer_id = %customer.id,
        cart_id = ctx.session.cart_id().map_or("-", |id| id.as_str()),
        "Signed in"
    );
    Ok(())
}

/// Sign out.
pub fn logout(ctx: &mut Context) -> Result<(), CommandError> {
    ctx.accounts.sign_out(&mut ctx.session)?;
    Ok(())
}

/// Apply default-address checkboxes to an existing customer.
pub async fn defaults(
    ctx: &Context,
    customer_id: Option<String>,
    checkboxes: CheckboxState,
) -> Result<(), CommandError> {
    let customer_id = match customer_id {
        Some(id) => CustomerId::new(id),
        None => ctx
            .session
            .customer()
            .map(|c| c.id.clone())
            .ok_or(CommandError::NotSignedIn)?,
    };

    match ctx
        .accounts
        .apply_default_addresses(&customer_id, checkboxes)
        .await?
    {
        Some(customer) => info!(
            shipping = ?customer.default_shipping_address_id,
            billing = ?customer.default_billing_address_id,
            "Default addresses set"
        ),
        None => info!("Default addresses unchanged"),
    }
    Ok(())
}
