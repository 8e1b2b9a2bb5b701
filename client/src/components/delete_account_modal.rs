//! Delete-account confirmation dialog.
//!
//! The user must type the confirmation word before the delete is sent.

#[cfg(test)]
#[path = "delete_account_modal_test.rs"]
mod delete_account_modal_test;

use crate::net::error::ApiError;
use crate::router::Route;
use crate::services::auth::AuthService;

pub const CONFIRMATION_WORD: &str = "delete";

#[derive(Debug, Default)]
pub struct DeleteAccountDialog {
    confirm_text: String,
    is_pending: bool,
    error: Option<String>,
}

impl DeleteAccountDialog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_confirm_text(&mut self, text: &str) {
        self.confirm_text = text.to_owned();
    }

    /// Confirmation matches, case-insensitively, and nothing is in flight.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        !self.is_pending && self.confirm_text.eq_ignore_ascii_case(CONFIRMATION_WORD)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Delete the account if confirmed. `Ok(None)` means nothing was sent.
    ///
    /// # Errors
    ///
    /// Returns the backend error, which is also kept for display.
    pub async fn confirm(&mut self, auth: &AuthService) -> Result<Option<Route>, ApiError> {
        if !self.can_delete() {
            return Ok(None);
        }
        self.is_pending = true;
        self.error = None;
        let result = auth.delete_account().await;
        self.is_pending = false;
        match result {
            Ok(route) => {
                self.confirm_text.clear();
                Ok(Some(route))
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
