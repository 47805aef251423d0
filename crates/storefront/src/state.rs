//! Per-shopper application state.
//!
//! Every workflow takes `&mut Session`, so one shopper's chain of platform
//! calls owns the state for its whole duration. The cart is only ever
//! changed through [`Session::replace_cart`].

use cartline_core::{CartId, Price};

use crate::models::CustomerSession;
use crate::platform::Cart;

/// State shared by the cart and account workflows.
#[derive(Debug, Clone, Default)]
pub struct Session {
    cart: Option<Cart>,
    customer: Option<CustomerSession>,
}

impl Session {
    /// Empty anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for a signed-in customer.
    #[must_use]
    pub const fn for_customer(customer: CustomerSession) -> Self {
        Self {
            cart: None,
            customer: Some(customer),
        }
    }

    /// Current cart snapshot.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// ID of the current cart.
    #[must_use]
    pub fn cart_id(&self) -> Option<&CartId> {
        self.cart.as_ref().map(|cart| &cart.id)
    }

    /// Signed-in customer.
    #[must_use]
    pub const fn customer(&self) -> Option<&CustomerSession> {
        self.customer.as_ref()
    }

    /// Replace the cart with the platform's latest snapshot.
    pub fn replace_cart(&mut self, cart: Cart) {
        tracing::debug!(
            cart_id = %cart.id,
            version = cart.version,
            lines = cart.line_items.len(),
            "Session cart replaced"
        );
        self.cart = Some(cart);
    }

    /// Set or clear the signed-in customer.
    pub fn set_customer(&mut self, customer: Option<CustomerSession>) {
        self.customer = customer;
    }

    /// Cart total in major units, `None` without a cart.
    #[must_use]
    pub fn total_price(&self) -> Option<Price> {
        self.cart.as_ref().map(|cart| cart.total_price.to_price())
    }
}
