//! Presentation seam for the registration flow.
//!
//! The workflows never touch a UI directly; they report through this trait
//! and the front end decides how to render it.

use crate::models::Page;

/// Feedback the registration flow gives the shopper.
pub trait RegistrationView: Send {
    /// Show a message in the status panel.
    fn show_message(&mut self, message: &str);

    /// Show the modal overlay behind the status panel.
    fn show_overlay(&mut self);

    /// Show the inline "email already in use" hint.
    fn show_email_taken(&mut self);

    /// Mark the email field invalid, or clear the mark.
    fn set_email_invalid(&mut self, invalid: bool);

    /// Leave the current page.
    fn navigate(&mut self, page: Page);
}

impl<V: RegistrationView + ?Sized> RegistrationView for &mut V {
    fn show_message(&mut self, message: &str) {
        (**self).show_message(message);
    }

    fn show_overlay(&mut self) {
        (**self).show_overlay();
    }

    fn show_email_taken(&mut self) {
        (**self).show_email_taken();
    }

    fn set_email_invalid(&mut self, invalid: bool) {
        (**self).set_email_invalid(invalid);
    }

    fn navigate(&mut self, page: Page) {
        (**self).navigate(page);
    }
}
