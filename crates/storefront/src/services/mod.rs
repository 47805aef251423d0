//! Storefront workflows.
//!
//! # Services
//!
//! - `cart` - Cart gateway: every cart mutation as one versioned update
//! - `account` - Registration and default-address selection

pub mod account;
pub mod cart;

pub use account::AccountService;
pub use cart::{CartGateway, CartOutcome, CartPlan, QuantityChange, SkipReason, total_price};
