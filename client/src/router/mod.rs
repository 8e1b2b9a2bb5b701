//! Client routes and guarded navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! A UI shell calls [`Navigator::navigate`] for every route change. Guarded
//! routes consult `guards` against the session store, and redirects are
//! followed until a route is allowed.
//!
//! TRADE-OFFS
//! ==========
//! Redirects re-evaluate against a fresh snapshot each hop, so a session
//! that flips mid-navigation could in principle bounce. The hop count is
//! capped and the cap falls back to the login page.

pub mod guards;


use std::sync::Arc;

use tokio::sync::watch;

use crate::state::auth::SessionStore;
use guards::{Guard, GuardOutcome};

/// Upper bound on guard redirects followed by one navigation.
pub const MAX_REDIRECTS: usize = 4;

/// Client-side routes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Login,
    /// OAuth callback landing page.
    AuthSuccess,
    Welcome,
    Home,
    Admin,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AuthSuccess => "/auth-success",
            Self::Welcome => "/welcome",
            Self::Home => "/home",
            Self::Admin => "/admin",
        }
    }

    /// Resolve a location to a route. Query strings, fragments and trailing
    /// slashes are ignored; unknown paths (including `/`) land on login.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/');
        match path {
            "/auth-success" => Self::AuthSuccess,
            "/welcome" => Self::Welcome,
            "/home" => Self::Home,
            "/admin" => Self::Admin,
            _ => Self::Login,
        }
    }

    #[must_use]
    pub fn guard(self) -> Option<Guard> {
        match self {
            Self::Login | Self::AuthSuccess => None,
            Self::Welcome => Some(Guard::Welcome),
            Self::Home => Some(Guard::Home),
            Self::Admin => Some(Guard::Admin),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Holds the current route and applies guards on every change.
#[derive(Clone, Debug)]
pub struct Navigator {
    store: SessionStore,
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        let (tx, _rx) = watch::channel(Route::Login);
        Self { store, current: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    /// Navigate to `target`, following guard redirects. Returns the route
    /// actually shown.
    pub async fn navigate(&self, target: Route) -> Route {
        let mut route = target;
        for _ in 0..=MAX_REDIRECTS {
            let Some(guard) = route.guard() else {
                return self.settle(target, route);
            };
            let mut rx = self.store.subscribe();
            match guards::evaluate(guard, &mut rx).await {
                GuardOutcome::Allow => return self.settle(target, route),
                GuardOutcome::Redirect(next) => {
                    tracing::debug!(from = %route, to = %next, "guard redirect");
                    route = next;
                }
            }
        }
        tracing::warn!(target = %target, "redirect limit reached; falling back to login");
        self.settle(target, Route::Login)
    }

    /// Navigate to a raw location such as `/home` or `/auth-success?code=x`.
    pub async fn navigate_path(&self, location: &str) -> Route {
        self.navigate(Route::parse(location)).await
    }

    fn settle(&self, target: Route, route: Route) -> Route {
        tracing::info!(requested = %target, route = %route, "navigated");
        self.current.send_replace(route);
        route
    }
}
