//! Root application wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` owns the single session store and hands clones of it, the
//! navigator and the API client to every service and view it creates. A UI
//! shell or the CLI holds one `App` for the life of the process.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::components::add_item_modal::AddItemModal;
use crate::components::delete_account_modal::DeleteAccountDialog;
use crate::components::recommendation_modal::RecommendationsView;
use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::transport::{HttpTransport, Transport};
use crate::net::types::ItemKind;
use crate::pages::admin::AdminView;
use crate::pages::home::ListingView;
use crate::pages::welcome::WelcomeView;
use crate::router::{Navigator, Route};
use crate::services::auth::AuthService;
use crate::state::auth::SessionStore;

pub struct App {
    config: ClientConfig,
    navigator: Navigator,
    auth: AuthService,
}

impl App {
    /// Build an app talking HTTP to `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let store = SessionStore::new();
        let navigator = Navigator::new(store.clone());
        let api = ApiClient::new(transport, store, navigator.clone());
        Self { config, navigator, auth: AuthService::new(api) }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.auth.api().store()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        self.auth.api()
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Boot at `location`: check the session (or finish a login when the
    /// location is the callback page) and land on the guarded route.
    pub async fn start(&self, location: &str) -> Route {
        let route = Route::parse(location);
        if route == Route::AuthSuccess {
            self.auth.mark_callback_processing();
            self.navigator.navigate(Route::AuthSuccess).await;
            let query = location.split_once('?').map_or("", |(_, query)| query);
            return self.complete_login(query).await;
        }
        let state = self.auth.check_status().await;
        tracing::info!(logged_in = state.is_logged_in(), admin = state.is_admin(), "session checked");
        self.navigator.navigate(route).await
    }

    /// Finish an OAuth login from the callback query string
    /// (`code=...&state=...`).
    pub async fn complete_login(&self, query: &str) -> Route {
        let destination = match callback_params(query) {
            Some((code, state)) => self.auth.handle_callback(&code, &state).await,
            None => self.auth.abandon_callback(),
        };
        self.navigator.navigate(destination).await
    }

    /// Navigate to a raw location.
    pub async fn open(&self, location: &str) -> Route {
        self.navigator.navigate_path(location).await
    }

    pub async fn logout(&self) -> Route {
        let destination = self.auth.logout().await;
        self.navigator.navigate(destination).await
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    #[must_use]
    pub fn listing_view(&self) -> ListingView {
        ListingView::new(self.api().clone(), self.config.page_size, self.config.search_debounce())
    }

    #[must_use]
    pub fn welcome_view(&self) -> WelcomeView {
        WelcomeView::new(self.auth.clone())
    }

    #[must_use]
    pub fn admin_view(&self) -> AdminView {
        AdminView::new(self.api().clone())
    }

    #[must_use]
    pub fn add_item_modal(&self, kind: ItemKind) -> AddItemModal {
        AddItemModal::new(self.api().clone(), kind, self.config.page_size)
    }

    #[must_use]
    pub fn recommendations_view(&self) -> RecommendationsView {
        RecommendationsView::new(self.api().clone())
    }

    #[must_use]
    pub fn delete_account_dialog(&self) -> DeleteAccountDialog {
        DeleteAccountDialog::new()
    }
}

/// Pull non-empty `code` and `state` out of a callback query string.
#[must_use]
pub fn callback_params(query: &str) -> Option<(String, String)> {
    let mut url = reqwest::Url::parse("http://localhost/auth-success").ok()?;
    url.set_query(Some(query.trim_start_matches('?')));
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "state" if !value.is_empty() => state = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((code?, state?))
}
