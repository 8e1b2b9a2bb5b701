//! Typed REST endpoints and the shared 401/403 response policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! Services and views call [`ApiClient`] methods; every one of them funnels
//! through [`ApiClient::call`], which forwards to the [`Transport`] and then
//! applies the interceptor policy to the outcome.
//!
//! ERROR HANDLING
//! ==============
//! Errors are always returned to the caller unchanged. On top of that:
//! - 401 from anything but the auth handshake endpoints forces a logout and
//!   sends the user to the login page.
//! - 403 sends the user to the home page for their role.
//!
//! Both reactions run on a spawned task. They take the session loading flag
//! and wait on guards, so running them inline could wait on a flag the
//! caller itself is holding.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::error::ApiError;
use super::transport::{ApiRequest, Transport};
use super::types::{
    AgeRequest, AuthResponse, CallbackRequest, ItemKind, ListingQuery, ListingResponse, LoginResponse, NewBook,
    NewMovie, OnboardingStatus, Recommendation, RecommendationsResponse, Review, Tab, User,
};
use crate::router::{Navigator, Route};
use crate::state::auth::SessionStore;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const CALLBACK_PATH: &str = "/api/auth/callback";
pub const USER_PATH: &str = "/api/auth/user";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const ACCOUNT_PATH: &str = "/api/auth/account";
pub const COMPLETE_ONBOARDING_PATH: &str = "/api/auth/complete-onboarding";
pub const ONBOARDING_STATUS_PATH: &str = "/api/auth/onboarding-status";
pub const LISTINGS_PATH: &str = "/api/listings";
pub const REVIEWS_PATH: &str = "/api/reviews";
pub const RECOMMENDATIONS_PATH: &str = "/api/generate-recommendation";
pub const AGE_PATH: &str = "/api/user/age";

/// Endpoints whose 401 is an expected answer rather than an expired session.
const UNAUTHORIZED_EXEMPT: [&str; 4] = [LOGIN_PATH, CALLBACK_PATH, USER_PATH, LOGOUT_PATH];

/// Cloneable handle to the backend.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: SessionStore,
    navigator: Navigator,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, store: SessionStore, navigator: Navigator) -> Self {
        Self { transport, store, navigator }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Send one request and apply the 401/403 policy to a failure.
    ///
    /// # Errors
    ///
    /// Returns whatever the transport returned.
    pub async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let path = request.path.clone();
        let result = self.transport.send(request).await;
        if let Err(err) = &result {
            self.intercept(&path, err);
        }
        result
    }

    fn intercept(&self, path: &str, err: &ApiError) {
        match err {
            ApiError::Unauthorized { .. } if !UNAUTHORIZED_EXEMPT.contains(&path) => {
                tracing::warn!(%path, "session rejected; forcing logout");
                let client = self.clone();
                tokio::spawn(async move {
                    client.force_logout().await;
                });
            }
            ApiError::Forbidden { .. } => {
                let destination = if self.store.is_admin() { Route::Admin } else { Route::Home };
                tracing::warn!(%path, %destination, "access denied; redirecting");
                let navigator = self.navigator.clone();
                tokio::spawn(async move {
                    navigator.navigate(destination).await;
                });
            }
            _ => {}
        }
    }

    /// Best-effort server logout, then reset the session and show login.
    pub(crate) async fn force_logout(&self) {
        {
            let _loading = self.store.begin_loading();
            if let Err(e) = self.logout().await {
                tracing::debug!(error = %e, "logout call failed during forced logout");
            }
            self.store.set_logged_out();
        }
        self.navigator.navigate(Route::Login).await;
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.call(request).await?;
        decode(value)
    }

    async fn send_ok(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.call(request).await.map(|_| ())
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body has no
    /// `auth_url`.
    pub async fn login_url(&self) -> Result<String, ApiError> {
        let body: LoginResponse = self.fetch(ApiRequest::get(LOGIN_PATH)).await?;
        Ok(body.auth_url)
    }

    /// Exchange an OAuth `code`/`state` pair for a session.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the backend rejects the exchange.
    pub async fn exchange_code(&self, code: &str, state: &str) -> Result<User, ApiError> {
        let body = to_json(&CallbackRequest { code: code.to_owned(), state: state.to_owned() })?;
        let response: AuthResponse = self.fetch(ApiRequest::post(CALLBACK_PATH, body)).await?;
        Ok(response.user)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when there is no session.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let response: AuthResponse = self.fetch(ApiRequest::get(USER_PATH)).await?;
        Ok(response.user)
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::get(LOGOUT_PATH)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::delete(ACCOUNT_PATH)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn complete_onboarding(&self) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::post(COMPLETE_ONBOARDING_PATH, json!({}))).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn onboarding_status(&self) -> Result<OnboardingStatus, ApiError> {
        self.fetch(ApiRequest::get(ONBOARDING_STATUS_PATH)).await
    }

    // =========================================================================
    // CATALOGUE
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn listings(&self, query: &ListingQuery) -> Result<ListingResponse, ApiError> {
        self.fetch(ApiRequest::get(LISTINGS_PATH).with_query(query.to_pairs())).await
    }

    /// Add an item to the user's list with a rating.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] carrying the backend message (for example when
    /// the item is already on the list).
    pub async fn submit_review(&self, review: &Review) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::post(REVIEWS_PATH, to_json(review)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn update_item(&self, kind: ItemKind, id: i64, changes: &Value) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::put(item_path(kind, id), changes.clone())).await
    }

    /// Remove an item from the user's list.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn delete_item(&self, kind: ItemKind, id: i64) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::delete(item_path(kind, id))).await
    }

    /// Generate recommendations for a tab. A missing `data` field is an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the body is malformed.
    pub async fn recommendations(&self, tab: Tab) -> Result<Vec<Recommendation>, ApiError> {
        let request = ApiRequest::get(RECOMMENDATIONS_PATH).with_query(vec![("type".into(), tab.as_str().into())]);
        let response: RecommendationsResponse = self.fetch(request).await?;
        Ok(response.data.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails.
    pub async fn set_age(&self, age: u8) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::post(AGE_PATH, to_json(&AgeRequest { age })?)).await
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`]; 403 also triggers the role redirect.
    pub async fn add_movie(&self, movie: &NewMovie) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::post(format!("/api/{}", ItemKind::Movie.collection()), to_json(movie)?))
            .await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`]; 403 also triggers the role redirect.
    pub async fn add_book(&self, book: &NewBook) -> Result<(), ApiError> {
        self.send_ok(ApiRequest::post(format!("/api/{}", ItemKind::Book.collection()), to_json(book)?))
            .await
    }
}

/// `/api/{movies|books}/{id}`.
#[must_use]
pub fn item_path(kind: ItemKind, id: i64) -> String {
    format!("/api/{}/{id}", kind.collection())
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
