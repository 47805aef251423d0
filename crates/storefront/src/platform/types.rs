//! Wire types for the commerce platform REST API.
//!
//! Field names follow the platform's camelCase JSON. Only the fields the
//! storefront reads are modelled; unknown fields are ignored on input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartline_core::{
    AddressId, CartId, CountryCode, CurrencyCode, CustomerId, LineItemId, Price, ProductId,
};

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in cents.
    pub cent_amount: i64,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
    /// Number of fraction digits (always 2 for the currencies we sell in).
    #[serde(default = "default_fraction_digits")]
    pub fraction_digits: u32,
}

const fn default_fraction_digits() -> u32 {
    2
}

impl Money {
    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            cent_amount: 0,
            currency_code,
            fraction_digits: 2,
        }
    }

    /// Major-unit price (`cent_amount / 100`).
    #[must_use]
    pub fn to_price(&self) -> Price {
        Price::from_cents(self.cent_amount, self.currency_code)
    }
}

/// Localized text keyed by locale (e.g. `en-US`).
pub type LocalizedString = BTreeMap<String, String>;

// =============================================================================
// Cart Types
// =============================================================================

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Line item ID (used by remove and change-quantity actions).
    pub id: LineItemId,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Quantity.
    pub quantity: u64,
    /// Product name.
    #[serde(default)]
    pub name: LocalizedString,
    /// Line total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Money>,
}

/// Cart lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CartState {
    #[default]
    Active,
    Merged,
    Ordered,
    Frozen,
}

/// Reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Referenced resource type (e.g. `discount-code`).
    pub type_id: String,
    /// Referenced resource ID.
    pub id: String,
}

/// Discount code applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodeInfo {
    /// The discount code resource.
    pub discount_code: Reference,
    /// `MatchesCart`, `DoesNotMatchCart`, ...
    pub state: String,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Version, required on every update.
    pub version: i64,
    /// Line items in insertion order.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Total price.
    pub total_price: Money,
    /// Owning customer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    /// Anonymous session ID, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_id: Option<String>,
    /// Lifecycle state.
    #[serde(default)]
    pub cart_state: CartState,
    /// Applied discount codes.
    #[serde(default)]
    pub discount_codes: Vec<DiscountCodeInfo>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Find the line holding `product_id`.
    #[must_use]
    pub fn line_for_product(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|item| &item.product_id == product_id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }
}

/// Body of a cart creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDraft {
    /// Cart currency.
    pub currency: CurrencyCode,
    /// Shipping country.
    pub country: CountryCode,
    /// Customer to attach the cart to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
}

/// A single cart update action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CartUpdateAction {
    /// Add one unit of a product (platform default quantity).
    AddLineItem {
        product_id: ProductId,
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<u64>,
    },
    /// Remove a line entirely.
    RemoveLineItem { line_item_id: LineItemId },
    /// Set a line's absolute quantity (zero removes it).
    ChangeLineItemQuantity {
        line_item_id: LineItemId,
        quantity: u64,
    },
    /// Attach the cart to a customer.
    SetCustomerId { customer_id: CustomerId },
    /// Apply a discount code.
    AddDiscountCode { code: String },
}

/// Versioned update request for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUpdate {
    /// Version the actions were computed against.
    pub version: i64,
    /// Actions applied in order.
    pub actions: Vec<CartUpdateAction>,
}

/// Paged query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedQueryResponse<T> {
    /// Requested page size.
    pub limit: u32,
    /// Offset of the first result.
    pub offset: u32,
    /// Number of results on this page.
    pub count: u32,
    /// Total matching results (only when requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Results.
    pub results: Vec<T>,
}

// =============================================================================
// Customer Types
// =============================================================================

/// A postal address stored on a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Address ID (assigned by the platform).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    /// Street name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Country.
    pub country: CountryCode,
}

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Version, required on every update.
    pub version: i64,
    /// Sign-in email.
    pub email: String,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Stored addresses in creation order.
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Default shipping address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_shipping_address_id: Option<AddressId>,
    /// Default billing address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_billing_address_id: Option<AddressId>,
}

/// Body of a sign-up request.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    /// Sign-in email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Date of birth (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Addresses; index 0 is shipping, index 1 billing when both are given.
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl std::fmt::Debug for CustomerDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerDraft")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("addresses", &self.addresses)
            .finish()
    }
}

impl std::fmt::Display for CustomerDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} <{}>", self.first_name, self.last_name, self.email)
    }
}

/// Which cart survives when an anonymous shopper signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActiveCartSignInMode {
    /// Fold the anonymous cart into the customer's existing cart.
    #[default]
    MergeWithExistingCustomerCart,
    /// Make the anonymous cart the customer's active cart.
    UseAsNewActiveCustomerCart,
}

/// Body of a sign-in request.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSignIn {
    /// Sign-in email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Anonymous cart to merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous_cart_id: Option<CartId>,
    /// Merge behaviour.
    pub active_cart_sign_in_mode: ActiveCartSignInMode,
}

impl std::fmt::Debug for CustomerSignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerSignIn")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("anonymous_cart_id", &self.anonymous_cart_id)
            .field("active_cart_sign_in_mode", &self.active_cart_sign_in_mode)
            .finish()
    }
}

/// Result of sign-in and sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSignInResult {
    /// The customer.
    pub customer: Customer,
    /// The customer's active cart, if the platform returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<Cart>,
}

/// A single customer update action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CustomerUpdateAction {
    /// Mark an address as the default shipping address.
    SetDefaultShippingAddress { address_id: AddressId },
    /// Mark an address as the default billing address.
    SetDefaultBillingAddress { address_id: AddressId },
}

/// Versioned update request for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    /// Version the actions were computed against.
    pub version: i64,
    /// Actions applied in order.
    pub actions: Vec<CustomerUpdateAction>,
}
