//! Default shipping/billing address selection.
//!
//! Registration collects up to two addresses: index 0 is the shipping
//! address, index 1 the billing address when it differs. Three checkboxes
//! decide which of them become the customer's defaults.

use cartline_core::AddressId;

use crate::error::{Error, Result};
use crate::platform::{Customer, CustomerUpdateAction};

/// Index of the shipping address in the registration form.
const SHIPPING_INDEX: usize = 0;

/// Index of the separate billing address in the registration form.
const BILLING_INDEX: usize = 1;

/// The registration form's default-address checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxState {
    /// "Set as default shipping address".
    pub ship_default: bool,
    /// "Use shipping address for billing".
    pub ship_as_bill: bool,
    /// "Set as default billing address".
    pub bill_default: bool,
}

impl Default for CheckboxState {
    fn default() -> Self {
        Self {
            ship_default: false,
            ship_as_bill: true,
            bill_default: false,
        }
    }
}

/// Which addresses become defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAddressDecision {
    /// Shipping default is address 0.
    ShippingOnly,
    /// Address 0 is both the shipping and billing default.
    SameForBoth,
    /// Shipping default is address 0, billing default is address 1.
    Separate,
    /// Billing default is address 1.
    BillingOnly,
    /// Leave the defaults alone.
    NoChange,
}

/// Map the checkboxes to a decision.
#[must_use]
pub const fn resolve_defaults(state: CheckboxState) -> DefaultAddressDecision {
    match (state.ship_default, state.ship_as_bill, state.bill_default) {
        (true, false, false) => DefaultAddressDecision::ShippingOnly,
        (true, true, false) => DefaultAddressDecision::SameForBoth,
        (true, false, true) => DefaultAddressDecision::Separate,
        (false, false, true) => DefaultAddressDecision::BillingOnly,
        _ => DefaultAddressDecision::NoChange,
    }
}

impl DefaultAddressDecision {
    /// Build the update actions for `customer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] if the decision names an address the
    /// customer does not have, or one the platform returned without an ID.
    pub fn actions(self, customer: &Customer) -> Result<Vec<CustomerUpdateAction>> {
        let (shipping, billing) = self.indices();

        let mut actions = Vec::with_capacity(2);
        if let Some(index) = shipping {
            actions.push(CustomerUpdateAction::SetDefaultShippingAddress {
                address_id: address_id(customer, index)?,
            });
        }
        if let Some(index) = billing {
            actions.push(CustomerUpdateAction::SetDefaultBillingAddress {
                address_id: address_id(customer, index)?,
            });
        }
        Ok(actions)
    }

    /// Check that a form with `available` addresses has every address this
    /// decision needs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAddress`] with the first index out of range.
    pub fn check_addresses(self, available: usize) -> Result<()> {
        let (shipping, billing) = self.indices();
        match shipping.into_iter().chain(billing).find(|&index| index >= available) {
            Some(index) => Err(Error::MissingAddress { index }),
            None => Ok(()),
        }
    }

    /// Address indices for the shipping and billing defaults.
    const fn indices(self) -> (Option<usize>, Option<usize>) {
        match self {
            Self::ShippingOnly => (Some(SHIPPING_INDEX), None),
            Self::SameForBoth => (Some(SHIPPING_INDEX), Some(SHIPPING_INDEX)),
            Self::Separate => (Some(SHIPPING_INDEX), Some(BILLING_INDEX)),
            Self::BillingOnly => (None, Some(BILLING_INDEX)),
            Self::NoChange => (None, None),
        }
    }
}

fn address_id(customer: &Customer, index: usize) -> Result<AddressId> {
    customer
        .addresses
        .get(index)
        .and_then(|address| address.id.clone())
        .ok_or(Error::MissingAddress { index })
}
