//! Pages the storefront can navigate to.

use core::fmt;

/// Navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Login,
    Registration,
    Catalog,
    Cart,
    Profile,
}

impl Page {
    /// Route path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Overview => "/overview",
            Self::Login => "/login",
            Self::Registration => "/registration",
            Self::Catalog => "/catalog",
            Self::Cart => "/cart",
            Self::Profile => "/profile",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
