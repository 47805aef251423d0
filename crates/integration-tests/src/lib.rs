//! Integration tests for Cartline.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_gateway` - Cart mutations, reads, merging and discounts
//! - `address_defaults` - Default shipping/billing selection
//! - `registration` - Sign-up feedback and follow-up updates
//! - `file_store` - State persisted between processes
//!
//! The workflows run against [`FakePlatform`], an in-memory platform that
//! checks versions and applies update actions the way the real API does,
//! and reports failures through the same error-body mapping as the HTTP
//! client. [`RecordingView`] captures what the registration flow shows.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::json;

use cartline_core::{AddressId, CartId, CurrencyCode, CustomerId, LineItemId, ProductId};
use cartline_storefront::models::Page;
use cartline_storefront::platform::errors::map_error_response;
use cartline_storefront::platform::{
    ActiveCartSignInMode, Cart, CartDraft, CartState, CartUpdate, CartUpdateAction,
    CommerceBackend, Customer, CustomerDraft, CustomerSignIn, CustomerSignInResult,
    CustomerUpdate, CustomerUpdateAction, DiscountCodeInfo, LineItem, Money, PagedQueryResponse,
    PlatformError, Reference,
};
use cartline_storefront::view::RegistrationView;

/// Unit price used for products without an explicit price.
pub const DEFAULT_UNIT_CENTS: i64 = 1000;

/// A call the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateCart(CartDraft),
    GetCart(CartId),
    GetCartByCustomer(CustomerId),
    QueryCarts(u32),
    UpdateCart(CartId, CartUpdate),
    SignIn(CustomerSignIn),
    SignUp(CustomerDraft),
    GetCustomer(CustomerId),
    UpdateCustomer(CustomerId, CustomerUpdate),
}

impl Request {
    /// Whether this call changes platform state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateCart(_)
                | Self::UpdateCart(..)
                | Self::SignIn(_)
                | Self::SignUp(_)
                | Self::UpdateCustomer(..)
        )
    }
}

#[derive(Debug)]
struct StoredCustomer {
    customer: Customer,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    carts: Vec<Cart>,
    customers: Vec<StoredCustomer>,
    prices: BTreeMap<ProductId, i64>,
    discount_codes: BTreeSet<String>,
    requests: Vec<Request>,
    fail_next: Option<(u16, String)>,
    sequence: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{}", self.sequence)
    }

    fn cart_mut(&mut self, id: &CartId) -> Result<&mut Cart, PlatformError> {
        self.carts
            .iter_mut()
            .find(|cart| &cart.id == id)
            .ok_or_else(|| not_found("cart", id.as_str()))
    }

    fn customer_mut(&mut self, id: &CustomerId) -> Result<&mut StoredCustomer, PlatformError> {
        self.customers
            .iter_mut()
            .find(|stored| &stored.customer.id == id)
            .ok_or_else(|| not_found("customer", id.as_str()))
    }

    fn active_cart_of(&self, customer_id: &CustomerId) -> Option<usize> {
        self.carts.iter().rposition(|cart| {
            cart.customer_id.as_ref() == Some(customer_id) && cart.cart_state == CartState::Active
        })
    }

    fn unit_price(&self, product_id: &ProductId) -> i64 {
        self.prices
            .get(product_id)
            .copied()
            .unwrap_or(DEFAULT_UNIT_CENTS)
    }

    /// Apply actions to a copy, so a rejected action leaves the cart as it
    /// was.
    fn apply_cart_actions(
        &mut self,
        cart: &Cart,
        actions: &[CartUpdateAction],
    ) -> Result<Cart, PlatformError> {
        let mut next = cart.clone();
        for action in actions {
            match action {
                CartUpdateAction::AddLineItem {
                    product_id,
                    quantity,
                } => {
                    let quantity = quantity.unwrap_or(1);
                    if let Some(line) = next
                        .line_items
                        .iter_mut()
                        .find(|line| &line.product_id == product_id)
                    {
                        line.quantity += quantity;
                    } else {
                        let id = LineItemId::new(self.next_id("line"));
                        next.line_items.push(LineItem {
                            id,
                            product_id: product_id.clone(),
                            quantity,
                            name: BTreeMap::from([(
                                "en-US".to_string(),
                                format!("Product {product_id}"),
                            )]),
                            total_price: None,
                        });
                    }
                }
                CartUpdateAction::RemoveLineItem { line_item_id } => {
                    let before = next.line_items.len();
                    next.line_items.retain(|line| &line.id != line_item_id);
                    if next.line_items.len() == before {
                        return Err(invalid_field("lineItemId", line_item_id.as_str()));
                    }
                }
                CartUpdateAction::ChangeLineItemQuantity {
                    line_item_id,
                    quantity,
                } => {
                    let Some(position) = next
                        .line_items
                        .iter()
                        .position(|line| &line.id == line_item_id)
                    else {
                        return Err(invalid_field("lineItemId", line_item_id.as_str()));
                    };
                    if *quantity == 0 {
                        next.line_items.remove(position);
                    } else if let Some(line) = next.line_items.get_mut(position) {
                        line.quantity = *quantity;
                    }
                }
                CartUpdateAction::SetCustomerId { customer_id } => {
                    next.customer_id = Some(customer_id.clone());
                }
                CartUpdateAction::AddDiscountCode { code } => {
                    if !self.discount_codes.contains(code) {
                        return Err(map_error_response(
                            400,
                            &json!({
                                "statusCode": 400,
                                "message": format!("The discount code '{code}' was not found."),
                                "errors": [{
                                    "code": "DiscountCodeNonApplicable",
                                    "message": format!("The discount code '{code}' was not found."),
                                }],
                            })
                            .to_string(),
                        ));
                    }
                    next.discount_codes.push(DiscountCodeInfo {
                        discount_code: Reference {
                            type_id: "discount-code".to_string(),
                            id: code.clone(),
                        },
                        state: "MatchesCart".to_string(),
                    });
                }
            }
        }
        next.version += 1;
        self.reprice(&mut next);
        Ok(next)
    }

    fn reprice(&self, cart: &mut Cart) {
        let currency = cart.total_price.currency_code;
        let mut total = 0_i64;
        for line in &mut cart.line_items {
            let cents = self.unit_price(&line.product_id)
                * i64::try_from(line.quantity).unwrap_or(i64::MAX);
            line.total_price = Some(Money {
                cent_amount: cents,
                currency_code: currency,
                fraction_digits: 2,
            });
            total += cents;
        }
        cart.total_price = Money {
            cent_amount: total,
            currency_code: currency,
            fraction_digits: 2,
        };
    }

    /// Fold `anonymous` into the customer's active cart, or adopt it when
    /// there is none.
    fn merge_into_customer(
        &mut self,
        customer_id: &CustomerId,
        anonymous_id: &CartId,
        mode: ActiveCartSignInMode,
    ) -> Result<Cart, PlatformError> {
        let anonymous = self.cart_mut(anonymous_id)?.clone();
        let existing = match mode {
            ActiveCartSignInMode::MergeWithExistingCustomerCart => {
                self.active_cart_of(customer_id)
            }
            ActiveCartSignInMode::UseAsNewActiveCustomerCart => None,
        };

        let Some(index) = existing.filter(|&i| {
            self.carts.get(i).is_some_and(|cart| cart.id != anonymous.id)
        }) else {
            let adopted = self.cart_mut(anonymous_id)?;
            adopted.customer_id = Some(customer_id.clone());
            adopted.version += 1;
            return Ok(adopted.clone());
        };

        let target = self
            .carts
            .get(index)
            .cloned()
            .ok_or_else(|| not_found("cart", customer_id.as_str()))?;
        let additions: Vec<CartUpdateAction> = anonymous
            .line_items
            .iter()
            .map(|line| CartUpdateAction::AddLineItem {
                product_id: line.product_id.clone(),
                quantity: Some(line.quantity),
            })
            .collect();
        let merged = self.apply_cart_actions(&target, &additions)?;

        if let Some(slot) = self.carts.get_mut(index) {
            *slot = merged.clone();
        }
        let old = self.cart_mut(anonymous_id)?;
        old.cart_state = CartState::Merged;
        old.version += 1;
        Ok(merged)
    }
}

/// In-memory commerce platform.
#[derive(Debug)]
pub struct FakePlatform {
    state: Mutex<State>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    /// Empty platform that accepts the `emp15` discount code.
    #[must_use]
    pub fn new() -> Self {
        let state = State {
            discount_codes: BTreeSet::from(["emp15".to_string()]),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a product's unit price in cents.
    #[must_use]
    pub fn with_price(self, product_id: &str, cent_amount: i64) -> Self {
        self.lock()
            .prices
            .insert(ProductId::new(product_id), cent_amount);
        self
    }

    /// Accept another discount code.
    #[must_use]
    pub fn with_discount_code(self, code: &str) -> Self {
        self.lock().discount_codes.insert(code.to_string());
        self
    }

    /// Store a customer directly, bypassing sign-up.
    pub fn seed_customer(&self, draft: &CustomerDraft) -> Customer {
        let mut state = self.lock();
        let customer = new_customer(&mut state, draft);
        state.customers.push(StoredCustomer {
            customer: customer.clone(),
            password: draft.password.clone(),
        });
        customer
    }

    /// Store a cart with the given lines (`product ID`, quantity).
    pub fn seed_cart(&self, customer_id: Option<&CustomerId>, lines: &[(&str, u64)]) -> Cart {
        let mut state = self.lock();
        let empty = empty_cart(&mut state, CurrencyCode::USD, customer_id.cloned());
        let additions: Vec<CartUpdateAction> = lines
            .iter()
            .map(|(product, quantity)| CartUpdateAction::AddLineItem {
                product_id: ProductId::new(*product),
                quantity: Some(*quantity),
            })
            .collect();
        let mut cart = state
            .apply_cart_actions(&empty, &additions)
            .unwrap_or(empty);
        cart.version = 1;
        state.carts.push(cart.clone());
        cart
    }

    /// Simulate another client changing the cart.
    pub fn touch_cart(&self, id: &CartId) {
        if let Ok(cart) = self.lock().cart_mut(id) {
            cart.version += 1;
        }
    }

    /// Answer the next call with this status and body instead of handling
    /// it.
    pub fn fail_next(&self, status: u16, body: serde_json::Value) {
        self.lock().fail_next = Some((status, body.to_string()));
    }

    /// Platform copy of a cart.
    #[must_use]
    pub fn cart(&self, id: &CartId) -> Option<Cart> {
        self.lock().carts.iter().find(|c| &c.id == id).cloned()
    }

    /// Platform copy of a customer.
    #[must_use]
    pub fn customer(&self, id: &CustomerId) -> Option<Customer> {
        self.lock()
            .customers
            .iter()
            .find(|stored| &stored.customer.id == id)
            .map(|stored| stored.customer.clone())
    }

    /// Every call received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Cart updates received so far.
    #[must_use]
    pub fn cart_updates(&self) -> Vec<CartUpdate> {
        self.lock()
            .requests
            .iter()
            .filter_map(|request| match request {
                Request::UpdateCart(_, update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of state-changing calls received so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.is_mutation())
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn begin(&self, request: Request) -> Result<MutexGuard<'_, State>, PlatformError> {
        let mut state = self.lock();
        state.requests.push(request);
        match state.fail_next.take() {
            Some((status, body)) => Err(map_error_response(status, &body)),
            None => Ok(state),
        }
    }
}

impl CommerceBackend for FakePlatform {
    async fn create_cart(&self, draft: &CartDraft) -> Result<Cart, PlatformError> {
        let mut state = self.begin(Request::CreateCart(draft.clone()))?;
        let cart = empty_cart(&mut state, draft.currency, draft.customer_id.clone());
        state.carts.push(cart.clone());
        Ok(cart)
    }

    async fn get_cart(&self, id: &CartId) -> Result<Cart, PlatformError> {
        let mut state = self.begin(Request::GetCart(id.clone()))?;
        state.cart_mut(id).map(|cart| cart.clone())
    }

    async fn get_cart_by_customer(&self, customer_id: &CustomerId) -> Result<Cart, PlatformError> {
        let state = self.begin(Request::GetCartByCustomer(customer_id.clone()))?;
        state
            .active_cart_of(customer_id)
            .and_then(|index| state.carts.get(index).cloned())
            .ok_or_else(|| not_found("cart for customer", customer_id.as_str()))
    }

    async fn query_carts(&self, limit: u32) -> Result<PagedQueryResponse<Cart>, PlatformError> {
        let state = self.begin(Request::QueryCarts(limit))?;
        let results: Vec<Cart> = state
            .carts
            .iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(PagedQueryResponse {
            limit,
            offset: 0,
            count: u32::try_from(results.len()).unwrap_or(u32::MAX),
            total: Some(state.carts.len() as u64),
            results,
        })
    }

    async fn update_cart(&self, id: &CartId, update: &CartUpdate) -> Result<Cart, PlatformError> {
        let mut state = self.begin(Request::UpdateCart(id.clone(), update.clone()))?;
        let current = state.cart_mut(id)?.clone();
        if current.version != update.version {
            return Err(version_conflict(id.as_str(), update.version, current.version));
        }

        let next = state.apply_cart_actions(&current, &update.actions)?;
        *state.cart_mut(id)? = next.clone();
        Ok(next)
    }

    async fn sign_in(
        &self,
        request: &CustomerSignIn,
    ) -> Result<CustomerSignInResult, PlatformError> {
        let mut state = self.begin(Request::SignIn(request.clone()))?;
        let Some(customer) = state
            .customers
            .iter()
            .find(|stored| {
                stored.customer.email.eq_ignore_ascii_case(&request.email)
                    && stored.password == request.password
            })
            .map(|stored| stored.customer.clone())
        else {
            return Err(map_error_response(
                400,
                &json!({
                    "statusCode": 400,
                    "message": "Account with the given credentials not found.",
                    "errors": [{
                        "code": "InvalidCredentials",
                        "message": "Account with the given credentials not found.",
                    }],
                })
                .to_string(),
            ));
        };

        let cart = match &request.anonymous_cart_id {
            Some(anonymous_id) => Some(state.merge_into_customer(
                &customer.id,
                anonymous_id,
                request.active_cart_sign_in_mode,
            )?),
            None => state
                .active_cart_of(&customer.id)
                .and_then(|index| state.carts.get(index).cloned()),
        };
        Ok(CustomerSignInResult { customer, cart })
    }

    async fn sign_up(&self, draft: &CustomerDraft) -> Result<CustomerSignInResult, PlatformError> {
        let mut state = self.begin(Request::SignUp(draft.clone()))?;
        if state
            .customers
            .iter()
            .any(|stored| stored.customer.email.eq_ignore_ascii_case(&draft.email))
        {
            return Err(map_error_response(
                400,
                &json!({
                    "statusCode": 400,
                    "message": "There is already an existing customer with the provided email.",
                    "errors": [{
                        "code": "DuplicateField",
                        "message": "There is already an existing customer with the provided email.",
                        "field": "email",
                        "duplicateValue": draft.email,
                    }],
                })
                .to_string(),
            ));
        }

        let customer = new_customer(&mut state, draft);
        state.customers.push(StoredCustomer {
            customer: customer.clone(),
            password: draft.password.clone(),
        });
        Ok(CustomerSignInResult {
            customer,
            cart: None,
        })
    }

    async fn get_customer(&self, id: &CustomerId) -> Result<Customer, PlatformError> {
        let mut state = self.begin(Request::GetCustomer(id.clone()))?;
        state.customer_mut(id).map(|stored| stored.customer.clone())
    }

    async fn update_customer(
        &self,
        id: &CustomerId,
        update: &CustomerUpdate,
    ) -> Result<Customer, PlatformError> {
        let mut state = self.begin(Request::UpdateCustomer(id.clone(), update.clone()))?;
        let stored = state.customer_mut(id)?;
        if stored.customer.version != update.version {
            return Err(version_conflict(
                id.as_str(),
                update.version,
                stored.customer.version,
            ));
        }

        let mut next = stored.customer.clone();
        for action in &update.actions {
            let (CustomerUpdateAction::SetDefaultShippingAddress { address_id }
            | CustomerUpdateAction::SetDefaultBillingAddress { address_id }) = action;
            if !next
                .addresses
                .iter()
                .any(|address| address.id.as_ref() == Some(address_id))
            {
                return Err(invalid_field("addressId", address_id.as_str()));
            }
            match action {
                CustomerUpdateAction::SetDefaultShippingAddress { address_id } => {
                    next.default_shipping_address_id = Some(address_id.clone());
                }
                CustomerUpdateAction::SetDefaultBillingAddress { address_id } => {
                    next.default_billing_address_id = Some(address_id.clone());
                }
            }
        }
        next.version += 1;
        stored.customer = next.clone();
        Ok(next)
    }
}

fn empty_cart(state: &mut State, currency: CurrencyCode, customer_id: Option<CustomerId>) -> Cart {
    let anonymous_id = customer_id.is_none().then(|| state.next_id("anonymous"));
    Cart {
        id: CartId::new(state.next_id("cart")),
        version: 1,
        line_items: Vec::new(),
        total_price: Money::zero(currency),
        customer_id,
        anonymous_id,
        cart_state: CartState::Active,
        discount_codes: Vec::new(),
        created_at: None,
        last_modified_at: None,
    }
}

fn new_customer(state: &mut State, draft: &CustomerDraft) -> Customer {
    let addresses = draft
        .addresses
        .iter()
        .map(|address| {
            let mut stored = address.clone();
            stored.id = Some(AddressId::new(state.next_id("address")));
            stored
        })
        .collect();
    Customer {
        id: CustomerId::new(state.next_id("customer")),
        version: 1,
        email: draft.email.clone(),
        first_name: Some(draft.first_name.clone()),
        last_name: Some(draft.last_name.clone()),
        addresses,
        default_shipping_address_id: None,
        default_billing_address_id: None,
    }
}

fn not_found(kind: &str, id: &str) -> PlatformError {
    let message = format!("The {kind} with ID '{id}' was not found.");
    map_error_response(
        404,
        &json!({
            "statusCode": 404,
            "message": message,
            "errors": [{ "code": "ResourceNotFound", "message": message }],
        })
        .to_string(),
    )
}

fn version_conflict(id: &str, expected: i64, actual: i64) -> PlatformError {
    let message = format!(
        "Object {id} has a different version than expected. Expected: {expected} - Actual: {actual}."
    );
    map_error_response(
        409,
        &json!({
            "statusCode": 409,
            "message": message,
            "errors": [{
                "code": "ConcurrentModification",
                "message": message,
                "currentVersion": actual,
            }],
        })
        .to_string(),
    )
}

fn invalid_field(field: &str, value: &str) -> PlatformError {
    let message = format!("The value '{value}' is not valid for field '{field}'.");
    map_error_response(
        400,
        &json!({
            "statusCode": 400,
            "message": message,
            "errors": [{ "code": "InvalidField", "message": message, "field": field }],
        })
        .to_string(),
    )
}

/// Something the registration flow showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Message(String),
    Overlay,
    EmailTaken,
    EmailInvalid(bool),
    Navigate(Page),
}

/// View that records every call.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    /// Pages navigated to, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<Page> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Navigate(page) => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Panel messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Message(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RegistrationView for RecordingView {
    fn show_message(&mut self, message: &str) {
        self.events.push(ViewEvent::Message(message.to_string()));
    }

    fn show_overlay(&mut self) {
        self.events.push(ViewEvent::Overlay);
    }

    fn show_email_taken(&mut self) {
        self.events.push(ViewEvent::EmailTaken);
    }

    fn set_email_invalid(&mut self, invalid: bool) {
        self.events.push(ViewEvent::EmailInvalid(invalid));
    }

    fn navigate(&mut self, page: Page) {
        self.events.push(ViewEvent::Navigate(page));
    }
}
