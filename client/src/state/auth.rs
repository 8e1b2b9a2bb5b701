//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by route guards and views, written only by `services::auth` (and the
//! interceptor's forced logout). One store exists per running client; it is
//! created by `App` and passed explicitly to everything that needs it.
//!
//! DESIGN
//! ======
//! The store wraps a `tokio::sync::watch` sender, so every mutation is a single
//! atomic replace and subscribers always see a whole state. `SessionState`
//! fields are private: the only ways to build one keep `is_admin` in lockstep
//! with the user's role.
//!
//! TRADE-OFFS
//! ==========
//! Auth operations are not serialised against each other. Loading guards are
//! counted, so the flag stays up until the last overlapping operation
//! finishes, but the session fields themselves take whichever response lands
//! last.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

use crate::net::types::User;

// =============================================================================
// SESSION STATE
// =============================================================================

/// The client's belief about who is logged in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    is_logged_in: bool,
    is_admin: bool,
    user: Option<User>,
    is_loading: bool,
}

impl SessionState {
    /// State at process start: nothing known yet, a status check is pending.
    #[must_use]
    pub fn initial() -> Self {
        Self { is_logged_in: false, is_admin: false, user: None, is_loading: true }
    }

    #[must_use]
    pub fn logged_out() -> Self {
        Self { is_logged_in: false, is_admin: false, user: None, is_loading: false }
    }

    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self { is_logged_in: true, is_admin: user.is_admin(), user: Some(user), is_loading: false }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// While set, the other fields may be stale and must not drive routing.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Logged in with a user record present. A flag without a record counts
    /// as logged out.
    #[must_use]
    pub fn signed_in_user(&self) -> Option<&User> {
        if self.is_logged_in { self.user.as_ref() } else { None }
    }

    fn with_loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Single-writer container for [`SessionState`] with subscribe/notify.
///
/// Cloning yields another handle to the same cell.
#[derive(Clone, Debug)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
    /// Live [`LoadingGuard`]s. Only touched inside `send_if_modified`, which
    /// serialises it with the flag it drives.
    loading_depth: Arc<AtomicUsize>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(SessionState::initial())
    }

    #[must_use]
    pub fn with_state(state: SessionState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx), loading_depth: Arc::new(AtomicUsize::new(0)) }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Stream of state changes, starting from the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.tx.borrow().is_admin
    }

    pub fn set_authenticated(&self, user: User) {
        tracing::info!(email = %user.email, role = %user.role, "session authenticated");
        self.replace(SessionState::authenticated(user));
    }

    pub fn set_logged_out(&self) {
        tracing::info!("session cleared");
        self.replace(SessionState::logged_out());
    }

    /// Mark onboarding done on the current user, leaving every other field
    /// untouched. No-op when nobody is logged in.
    pub fn mark_onboarding_complete(&self) {
        self.tx.send_if_modified(|state| {
            let Some(user) = state.user.as_mut() else {
                return false;
            };
            user.onboarding_completed = true;
            user.is_new_user = false;
            true
        });
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_if_modified(|state| {
            if state.is_loading == is_loading {
                return false;
            }
            state.is_loading = is_loading;
            true
        });
    }

    /// Raise the loading flag until the returned guard, and every other
    /// guard taken while it lives, has dropped.
    #[must_use = "loading is cleared as soon as the guard is dropped"]
    pub fn begin_loading(&self) -> LoadingGuard {
        self.tx.send_if_modified(|state| {
            self.loading_depth.fetch_add(1, Ordering::AcqRel);
            if state.is_loading {
                return false;
            }
            state.is_loading = true;
            true
        });
        LoadingGuard { store: self.clone() }
    }

    fn end_loading(&self) {
        self.tx.send_if_modified(|state| {
            let previous = self.loading_depth.fetch_sub(1, Ordering::AcqRel);
            if previous > 1 || !state.is_loading {
                return false;
            }
            state.is_loading = false;
            true
        });
    }

    fn replace(&self, next: SessionState) {
        tracing::debug!(logged_in = next.is_logged_in, admin = next.is_admin, "session state updated");
        self.tx.send_modify(|state| {
            // Mid-operation replacements keep the flag; the last guard clears it.
            *state = if state.is_loading { next.with_loading(true) } else { next };
        });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases one level of the store's loading flag on drop, on every exit
/// path.
#[derive(Debug)]
pub struct LoadingGuard {
    store: SessionStore,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.store.end_loading();
    }
}
