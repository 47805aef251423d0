//! Cartline Core - Shared types library.
//!
//! This crate provides common types used across all Cartline components:
//! - `storefront` - Cart gateway and account registration workflows
//! - `cli` - Command-line front end for driving a live project
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and locales

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
