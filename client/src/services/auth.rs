//! Auth operations that own every write to the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Called by `App` at startup and on the callback page, and by views for
//! logout, onboarding and account deletion. Each operation holds the store's
//! loading flag for its whole remote call, so guards never route from a
//! half-applied update.
//!
//! DESIGN
//! ======
//! Auth failures stop here: the store falls back to logged out and the
//! caller gets a destination route. Operations that a view reports inline
//! (`complete_onboarding`, `delete_account`) return their error as well.
//!
//! Status checks are coalesced. While a check or a callback exchange is in
//! flight, another check returns the current snapshot without a request.
//! Logout, callback and onboarding may overlap; whichever response lands
//! last decides the state.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{OnboardingStatus, User};
use crate::router::Route;
use crate::state::auth::{SessionState, SessionStore};

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    checking: Arc<AtomicBool>,
    processing_callback: Arc<AtomicBool>,
}

/// Clears an in-flight flag on drop.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Where a freshly authenticated user belongs.
#[must_use]
pub fn landing_route(user: &User) -> Route {
    if user.is_admin() {
        Route::Admin
    } else if user.needs_onboarding() {
        Route::Welcome
    } else {
        Route::Home
    }
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            checking: Arc::new(AtomicBool::new(false)),
            processing_callback: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn store(&self) -> &SessionStore {
        self.api.store()
    }

    /// Ask the backend who is logged in and record the answer.
    ///
    /// A failure leaves a logged-out session, unless a callback exchange is
    /// running, in which case the exchange decides.
    pub async fn check_status(&self) -> SessionState {
        if self.processing_callback.load(Ordering::Acquire)
            || self.checking.swap(true, Ordering::AcqRel)
        {
            tracing::debug!("status check already in flight; returning current state");
            return self.store().snapshot();
        }
        let _checking = FlagGuard(&self.checking);
        let loading = self.store().begin_loading();

        match self.api.current_user().await {
            Ok(user) => self.store().set_authenticated(user),
            Err(e) if self.processing_callback.load(Ordering::Acquire) => {
                tracing::debug!(error = %e, "status check failed during callback; leaving state");
            }
            Err(e) => {
                tracing::info!(error = %e, "no active session");
                self.store().set_logged_out();
            }
        }
        drop(loading);
        self.store().snapshot()
    }

    /// Fetch the identity provider's authorization URL.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the backend cannot produce one.
    pub async fn initiate_login(&self) -> Result<String, ApiError> {
        let url = self.api.login_url().await?;
        tracing::info!("login URL issued");
        Ok(url)
    }

    /// Suppress status checks until the next callback exchange finishes.
    pub fn mark_callback_processing(&self) {
        self.processing_callback.store(true, Ordering::Release);
    }

    /// Leave the callback page without an exchange (missing parameters).
    pub fn abandon_callback(&self) -> Route {
        self.processing_callback.store(false, Ordering::Release);
        tracing::warn!("callback without code or state");
        self.store().set_logged_out();
        self.store().set_loading(false);
        Route::Login
    }

    /// Exchange the OAuth callback parameters for a session and return where
    /// the user should go next.
    pub async fn handle_callback(&self, code: &str, state: &str) -> Route {
        self.processing_callback.store(true, Ordering::Release);
        let _processing = FlagGuard(&self.processing_callback);
        let _loading = self.store().begin_loading();

        match self.api.exchange_code(code, state).await {
            Ok(user) => {
                let route = landing_route(&user);
                tracing::info!(email = %user.email, %route, "callback accepted");
                self.store().set_authenticated(user);
                route
            }
            Err(e) => {
                tracing::warn!(error = %e, "callback rejected");
                self.store().set_logged_out();
                Route::Login
            }
        }
    }

    /// End the session. The local state is reset whatever the backend says.
    pub async fn logout(&self) -> Route {
        let _loading = self.store().begin_loading();
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "logout request failed; clearing session anyway");
        }
        self.store().set_logged_out();
        Route::Login
    }

    /// Permanently delete the account and end the session.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the session is left untouched in that case.
    pub async fn delete_account(&self) -> Result<Route, ApiError> {
        let _loading = self.store().begin_loading();
        self.api.delete_account().await?;
        tracing::info!("account deleted");
        self.store().set_logged_out();
        Ok(Route::Login)
    }

    /// Mark onboarding finished on the backend, then patch the local user.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the user record is unchanged in that case.
    pub async fn complete_onboarding(&self) -> Result<(), ApiError> {
        let _loading = self.store().begin_loading();
        self.api.complete_onboarding().await?;
        self.store().mark_onboarding_complete();
        tracing::info!("onboarding completed");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn onboarding_status(&self) -> Result<OnboardingStatus, ApiError> {
        self.api.onboarding_status().await
    }
}
