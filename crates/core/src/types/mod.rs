//! Core types for Cartline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod locale;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use locale::{CountryCode, CurrencyCode, UnknownCountry};
pub use price::Price;
