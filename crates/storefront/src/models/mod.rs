//! Storefront-side models that are not platform wire types.

pub mod page;
pub mod session;

pub use page::Page;
pub use session::{CustomerSession, storage_keys};
