//! Cartline storefront library.
//!
//! Client-side cart and account workflows against a commerce platform's
//! REST API. Everything a front end needs goes through three entry points:
//!
//! - [`services::CartGateway`] for cart intents
//! - [`services::AccountService`] for registration and default addresses
//! - [`state::Session`], the per-shopper state both of them update
//!
//! Persistence and presentation are injected through
//! [`storage::KeyValueStore`] and [`view::RegistrationView`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod services;
pub mod state;
pub mod storage;
pub mod validate;
pub mod view;

pub use error::{Error, Result};
