//! Cart gateway.
//!
//! Every mutation follows the same protocol: read the session cart's
//! version, send one [`CartUpdate`] carrying that version and one or more
//! actions, then replace the session cart with the platform's response.
//! There is no local optimistic change and no retry; a stale version fails
//! with [`PlatformError::VersionConflict`](crate::platform::PlatformError).
//!
//! Which actions to send is decided by the pure `plan_*` functions, so the
//! "nothing to do" cases are values ([`CartPlan::Skip`]) rather than silent
//! early returns.

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use cartline_core::{CartId, CountryCode, CurrencyCode, CustomerId, ProductId};

use crate::config::{CartSettings, reveal};
use crate::error::{Error, Result};
use crate::models::storage_keys;
use crate::platform::{
    ActiveCartSignInMode, CART_QUERY_LIMIT, Cart, CartDraft, CartUpdate, CartUpdateAction,
    CommerceBackend, CustomerSignIn, CustomerSignInResult, PagedQueryResponse, PlatformError,
};
use crate::state::Session;
use crate::storage::KeyValueStore;

/// Currency every cart is created in.
pub const CART_CURRENCY: CurrencyCode = CurrencyCode::USD;

/// Country every cart is created for.
pub const CART_COUNTRY: CountryCode = CountryCode::US;

/// Direction of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Increase,
    Decrease,
}

impl QuantityChange {
    /// New absolute quantity. Decreasing saturates at zero; the platform
    /// removes a line whose quantity is set to zero.
    #[must_use]
    pub const fn apply(self, quantity: u64) -> u64 {
        match self {
            Self::Increase => quantity.saturating_add(1),
            Self::Decrease => quantity.saturating_sub(1),
        }
    }
}

/// Why a cart operation sent nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// There is no cart to change.
    NoCart,
    /// The product has no line in the cart.
    ProductNotInCart,
    /// The cart has no lines to remove.
    CartEmpty,
}

/// Actions to send for a cart intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartPlan {
    /// Send these actions in one update.
    Submit(Vec<CartUpdateAction>),
    /// Send nothing.
    Skip(SkipReason),
}

/// Result of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The platform accepted the update; the session holds this version.
    Updated {
        /// New cart version.
        version: i64,
    },
    /// Nothing was sent.
    Unchanged(SkipReason),
}

/// Plan adding one unit of `product_id`.
#[must_use]
pub fn plan_add(product_id: &ProductId) -> CartPlan {
    CartPlan::Submit(vec![CartUpdateAction::AddLineItem {
        product_id: product_id.clone(),
        quantity: None,
    }])
}

/// Plan removing the line holding `product_id`.
#[must_use]
pub fn plan_remove(cart: Option<&Cart>, product_id: &ProductId) -> CartPlan {
    let Some(cart) = cart else {
        return CartPlan::Skip(SkipReason::NoCart);
    };
    cart.line_for_product(product_id)
        .map_or(CartPlan::Skip(SkipReason::ProductNotInCart), |line| {
            CartPlan::Submit(vec![CartUpdateAction::RemoveLineItem {
                line_item_id: line.id.clone(),
            }])
        })
}

/// Plan a one-unit quantity change on the line holding `product_id`.
#[must_use]
pub fn plan_change_quantity(
    cart: Option<&Cart>,
    product_id: &ProductId,
    change: QuantityChange,
) -> CartPlan {
    let Some(cart) = cart else {
        return CartPlan::Skip(SkipReason::NoCart);
    };
    cart.line_for_product(product_id)
        .map_or(CartPlan::Skip(SkipReason::ProductNotInCart), |line| {
            CartPlan::Submit(vec![CartUpdateAction::ChangeLineItemQuantity {
                line_item_id: line.id.clone(),
                quantity: change.apply(line.quantity),
            }])
        })
}

/// Plan removing every line, batched into one update.
#[must_use]
pub fn plan_clear(cart: Option<&Cart>) -> CartPlan {
    let Some(cart) = cart else {
        return CartPlan::Skip(SkipReason::NoCart);
    };
    if cart.line_items.is_empty() {
        return CartPlan::Skip(SkipReason::CartEmpty);
    }
    CartPlan::Submit(
        cart.line_items
            .iter()
            .map(|line| CartUpdateAction::RemoveLineItem {
                line_item_id: line.id.clone(),
            })
            .collect(),
    )
}

/// Cart total in major units (`cent_amount / 100`), `None` without a cart.
#[must_use]
pub fn total_price(session: &Session) -> Option<Decimal> {
    session.total_price().map(|price| price.amount)
}

/// Translates cart intents into platform updates.
pub struct CartGateway<B, S> {
    backend: B,
    store: S,
    settings: CartSettings,
}

impl<B: CommerceBackend, S: KeyValueStore> CartGateway<B, S> {
    /// Create a gateway over a backend and a store.
    pub const fn new(backend: B, store: S, settings: CartSettings) -> Self {
        Self {
            backend,
            store,
            settings,
        }
    }

    /// The platform backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The key/value store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create a cart and make it the session cart.
    ///
    /// The signed-in customer is attached when the session token flag is
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform call or storage write fails.
    #[instrument(skip(self, session))]
    pub async fn create_cart(&self, session: &mut Session) -> Result<CartId> {
        let customer_id = if self.store.contains(storage_keys::TOKEN_STORE)? {
            session.customer().map(|c| c.id.clone())
        } else {
            None
        };

        let draft = CartDraft {
            currency: CART_CURRENCY,
            country: CART_COUNTRY,
            customer_id,
        };
        let cart = self.backend.create_cart(&draft).await?;
        let id = cart.id.clone();

        self.store.set(storage_keys::CART_ID, id.as_str())?;
        session.replace_cart(cart);
        info!(cart_id = %id, "Cart created");
        Ok(id)
    }

    /// Add one unit of `product_id`, creating the cart first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if any platform call or storage access fails.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        session: &mut Session,
        product_id: &ProductId,
    ) -> Result<CartOutcome> {
        self.load_cart(session).await?;
        if session.cart().is_none() {
            self.create_cart(session).await?;
        }
        self.submit(session, plan_add(product_id)).await
    }

    /// Remove the line holding `product_id`; no-op if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a platform call or storage access fails.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn remove_item(
        &self,
        session: &mut Session,
        product_id: &ProductId,
    ) -> Result<CartOutcome> {
        self.load_cart(session).await?;
        let plan = plan_remove(session.cart(), product_id);
        self.submit(session, plan).await
    }

    /// Change the quantity of `product_id` by one; no-op if it is not in
    /// the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a platform call or storage access fails.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn change_quantity(
        &self,
        session: &mut Session,
        product_id: &ProductId,
        change: QuantityChange,
    ) -> Result<CartOutcome> {
        self.load_cart(session).await?;
        let plan = plan_change_quantity(session.cart(), product_id, change);
        self.submit(session, plan).await
    }

    /// Remove every line in one batched update. The cart itself is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if a platform call or storage access fails.
    #[instrument(skip(self, session))]
    pub async fn clear_cart(&self, session: &mut Session) -> Result<CartOutcome> {
        self.load_cart(session).await?;
        let plan = plan_clear(session.cart());
        self.submit(session, plan).await
    }

    /// Fetch the signed-in customer's cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] without a customer, or the platform
    /// error.
    #[instrument(skip(self, session))]
    pub async fn get_customer_cart(&self, session: &Session) -> Result<Cart> {
        let customer = session.customer().ok_or(Error::NotSignedIn)?;
        Ok(self.backend.get_cart_by_customer(&customer.id).await?)
    }

    /// Fetch the cart whose ID is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveCart`] if no cart ID is stored, or the
    /// platform error.
    #[instrument(skip(self))]
    pub async fn get_anonymous_cart(&self) -> Result<Cart> {
        let id = self
            .store
            .get(storage_keys::CART_ID)?
            .ok_or(Error::NoActiveCart)?;
        Ok(self.backend.get_cart(&CartId::new(id)).await?)
    }

    /// List carts (one page of [`CART_QUERY_LIMIT`]).
    ///
    /// # Errors
    ///
    /// Returns the platform error.
    #[instrument(skip(self))]
    pub async fn get_all_carts(&self) -> Result<PagedQueryResponse<Cart>> {
        Ok(self.backend.query_carts(CART_QUERY_LIMIT).await?)
    }

    /// Attach the current cart to `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveCart`] without a cart, or the platform error.
    #[instrument(skip(self, session), fields(customer_id = %customer_id))]
    pub async fn set_customer_id(
        &self,
        session: &mut Session,
        customer_id: &CustomerId,
    ) -> Result<CartOutcome> {
        self.load_cart(session).await?;
        if session.cart().is_none() {
            return Err(Error::NoActiveCart);
        }
        let plan = CartPlan::Submit(vec![CartUpdateAction::SetCustomerId {
            customer_id: customer_id.clone(),
        }]);
        self.submit(session, plan).await
    }

    /// Sign the session customer in again with
    /// [`ActiveCartSignInMode::MergeWithExistingCustomerCart`], folding the
    /// anonymous cart into the customer's cart.
    ///
    /// When the platform returns the merged cart it becomes the session cart
    /// and its ID is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] or [`Error::MissingPassword`] when the
    /// credentials are unavailable, or the platform error.
    #[instrument(skip(self, session))]
    pub async fn merge_carts(&self, session: &mut Session) -> Result<CustomerSignInResult> {
        let customer = session.customer().ok_or(Error::NotSignedIn)?;
        let password = match &customer.password {
            Some(secret) => reveal(secret).to_string(),
            None => self
                .store
                .get(storage_keys::PASSWORD)?
                .ok_or(Error::MissingPassword)?,
        };
        let anonymous_cart_id = match session.cart_id() {
            Some(id) => Some(id.clone()),
            None => self.store.get(storage_keys::CART_ID)?.map(CartId::new),
        };

        let request = CustomerSignIn {
            email: customer.email.as_str().to_string(),
            password,
            anonymous_cart_id,
            active_cart_sign_in_mode: ActiveCartSignInMode::MergeWithExistingCustomerCart,
        };
        let mut result = self.backend.sign_in(&request).await?;

        if let Some(cart) = result.cart.take() {
            self.store.set(storage_keys::CART_ID, cart.id.as_str())?;
            session.replace_cart(cart.clone());
            result.cart = Some(cart);
        }
        info!(customer_id = %result.customer.id, "Carts merged");
        Ok(result)
    }

    /// Apply a discount code, or the configured default when `code` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveCart`] without a cart, or the platform error.
    #[instrument(skip(self, session))]
    pub async fn add_discount_code(
        &self,
        session: &mut Session,
        code: Option<&str>,
    ) -> Result<Cart> {
        self.load_cart(session).await?;
        if session.cart().is_none() {
            return Err(Error::NoActiveCart);
        }
        let code = code.unwrap_or(&self.settings.default_discount_code);
        let plan = CartPlan::Submit(vec![CartUpdateAction::AddDiscountCode {
            code: code.to_string(),
        }]);
        self.submit(session, plan).await?;
        session.cart().cloned().ok_or(Error::NoActiveCart)
    }

    /// Put the stored cart into an empty session.
    ///
    /// A stored ID the platform no longer knows is forgotten.
    async fn load_cart(&self, session: &mut Session) -> Result<()> {
        if session.cart().is_some() {
            return Ok(());
        }
        let Some(id) = self.store.get(storage_keys::CART_ID)? else {
            return Ok(());
        };

        match self.backend.get_cart(&CartId::new(id)).await {
            Ok(cart) => {
                session.replace_cart(cart);
                Ok(())
            }
            Err(PlatformError::NotFound(message)) => {
                warn!(%message, "Stored cart no longer exists");
                self.store.remove(storage_keys::CART_ID)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Send a plan against the session cart's current version.
    async fn submit(&self, session: &mut Session, plan: CartPlan) -> Result<CartOutcome> {
        let actions = match plan {
            CartPlan::Submit(actions) => actions,
            CartPlan::Skip(reason) => {
                debug!(?reason, "Cart update skipped");
                return Ok(CartOutcome::Unchanged(reason));
            }
        };
        let cart = session.cart().ok_or(Error::NoActiveCart)?;
        let update = CartUpdate {
            version: cart.version,
            actions,
        };

        let updated = self.backend.update_cart(&cart.id, &update).await?;
        let version = updated.version;
        session.replace_cart(updated);
        Ok(CartOutcome::Updated { version })
    }
}

#[cfg(test)]
mod tests {
    use cartline_core::LineItemId;

    use super::*;
    use crate::platform::{LineItem, Money};

    fn cart_with(lines: &[(&str, &str, u64)]) -> Cart {
        Cart {
            id: CartId::new("cart-1"),
            version: 3,
            line_items: lines
                .iter()
                .map(|(line, product, quantity)| LineItem {
                    id: LineItemId::new(*line),
                    product_id: ProductId::new(*product),
                    quantity: *quantity,
                    name: Default::default(),
                    total_price: None,
                })
                .collect(),
            total_price: Money::zero(CurrencyCode::USD),
            customer_id: None,
            anonymous_id: None,
            cart_state: Default::default(),
            discount_codes: Vec::new(),
            created_at: None,
            last_modified_at: None,
        }
    }

    #[test]
    fn test_quantity_change_saturates_at_zero() {
        assert_eq!(QuantityChange::Increase.apply(1), 2);
        assert_eq!(QuantityChange::Decrease.apply(1), 0);
        assert_eq!(QuantityChange::Decrease.apply(0), 0);
        assert_eq!(QuantityChange::Increase.apply(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_plan_remove_uses_line_item_id() {
        let cart = cart_with(&[("li-1", "p-1", 1), ("li-2", "p-2", 4)]);
        assert_eq!(
            plan_remove(Some(&cart), &ProductId::new("p-2")),
            CartPlan::Submit(vec![CartUpdateAction::RemoveLineItem {
                line_item_id: LineItemId::new("li-2"),
            }])
        );
    }

    #[test]
    fn test_plans_skip_absent_products_and_carts() {
        let cart = cart_with(&[("li-1", "p-1", 1)]);
        let missing = ProductId::new("p-9");

        assert_eq!(
            plan_remove(Some(&cart), &missing),
            CartPlan::Skip(SkipReason::ProductNotInCart)
        );
        assert_eq!(
            plan_change_quantity(Some(&cart), &missing, QuantityChange::Increase),
            CartPlan::Skip(SkipReason::ProductNotInCart)
        );
        assert_eq!(plan_remove(None, &missing), CartPlan::Skip(SkipReason::NoCart));
        assert_eq!(plan_clear(None), CartPlan::Skip(SkipReason::NoCart));
        assert_eq!(
            plan_clear(Some(&cart_with(&[]))),
            CartPlan::Skip(SkipReason::CartEmpty)
        );
    }

    #[test]
    fn test_plan_change_quantity_sends_absolute_quantity() {
        let cart = cart_with(&[("li-1", "p-1", 2)]);
        let product = ProductId::new("p-1");

        assert_eq!(
            plan_change_quantity(Some(&cart), &product, QuantityChange::Decrease),
            CartPlan::Submit(vec![CartUpdateAction::ChangeLineItemQuantity {
                line_item_id: LineItemId::new("li-1"),
                quantity: 1,
            }])
        );
        assert_eq!(
            plan_change_quantity(Some(&cart), &product, QuantityChange::Increase),
            CartPlan::Submit(vec![CartUpdateAction::ChangeLineItemQuantity {
                line_item_id: LineItemId::new("li-1"),
                quantity: 3,
            }])
        );
    }

    #[test]
    fn test_plan_clear_batches_one_removal_per_line() {
        let cart = cart_with(&[("li-1", "p-1", 1), ("li-2", "p-2", 1), ("li-3", "p-3", 5)]);
        let CartPlan::Submit(actions) = plan_clear(Some(&cart)) else {
            panic!("expected a submit plan");
        };
        assert_eq!(actions.len(), 3);
        assert!(
            actions
                .iter()
                .all(|a| matches!(a, CartUpdateAction::RemoveLineItem { .. }))
        );
    }

    #[test]
    fn test_plan_add_lets_platform_pick_quantity() {
        assert_eq!(
            plan_add(&ProductId::new("p-1")),
            CartPlan::Submit(vec![CartUpdateAction::AddLineItem {
                product_id: ProductId::new("p-1"),
                quantity: None,
            }])
        );
    }
}
