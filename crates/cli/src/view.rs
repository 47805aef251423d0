//! Registration feedback rendered as log lines.

use tracing::{info, warn};

use cartline_storefront::models::Page;
use cartline_storefront::view::RegistrationView;

/// Reports registration feedback through `tracing`.
#[derive(Debug, Default)]
pub struct TerminalView {
    email_invalid: bool,
}

impl TerminalView {
    /// Whether the last outcome marked the email field invalid.
    pub const fn email_invalid(&self) -> bool {
        self.email_invalid
    }
}

impl RegistrationView for TerminalView {
    fn show_message(&mut self, message: &str) {
        info!("{message}");
    }

    fn show_overlay(&mut self) {}

    fn show_email_taken(&mut self) {
        warn!("A customer with this email already exists. Log in or use another email.");
    }

    fn set_email_invalid(&mut self, invalid: bool) {
        self.email_invalid = invalid;
    }

    fn navigate(&mut self, page: Page) {
        info!(page = %page, "Continue at");
    }
}
