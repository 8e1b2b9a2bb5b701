use std::time::Duration;

use reqwest::Method;

use super::*;
use crate::net::mock::{MockTransport, forbidden, network_down, unauthorized, user_json};
use crate::net::types::User;
use crate::state::auth::SessionState;

fn onboarded(role: &str) -> SessionState {
    SessionState::authenticated(User {
        display_name: "Ada".into(),
        email: "ada@example.test".into(),
        role: role.into(),
        is_new_user: false,
        onboarding_completed: true,
    })
}

fn client(mock: &Arc<MockTransport>, state: SessionState) -> ApiClient {
    let store = SessionStore::with_state(state);
    let navigator = Navigator::new(store.clone());
    ApiClient::new(mock.clone(), store, navigator)
}

async fn next_route(rx: &mut tokio::sync::watch::Receiver<Route>) -> Route {
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("navigation should happen")
        .expect("navigator alive");
    *rx.borrow_and_update()
}

// =============================================================
// Request shapes
// =============================================================

#[tokio::test]
async fn login_url_reads_auth_url() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, LOGIN_PATH, Ok(serde_json::json!({ "auth_url": "https://idp.test/authorize" })));
    let api = client(&mock, SessionState::logged_out());

    assert_eq!(api.login_url().await.unwrap(), "https://idp.test/authorize");
}

#[tokio::test]
async fn exchange_code_posts_code_and_state() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, CALLBACK_PATH, Ok(user_json("user", true, false)));
    let api = client(&mock, SessionState::logged_out());

    let user = api.exchange_code("abc", "xyz").await.unwrap();

    assert!(user.is_new_user);
    let calls = mock.calls_to(CALLBACK_PATH);
    assert_eq!(calls[0].body, Some(serde_json::json!({ "code": "abc", "state": "xyz" })));
}

#[tokio::test]
async fn listings_sends_query_pairs() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, LISTINGS_PATH, Ok(serde_json::json!({ "status": "success" })));
    let api = client(&mock, onboarded("user"));
    let query = ListingQuery {
        kind: Some(ItemKind::Book),
        search_global: false,
        query: "dune".into(),
        page: 2,
        per_page: 12,
    };

    let response = api.listings(&query).await.unwrap();

    assert!(response.data.books.is_empty());
    let call = &mock.calls_to(LISTINGS_PATH)[0];
    assert_eq!(call.query_param("type"), Some("book"));
    assert_eq!(call.query_param("query"), Some("dune"));
    assert_eq!(call.query_param("page"), Some("2"));
}

#[tokio::test]
async fn submit_review_uses_camel_case_body() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, REVIEWS_PATH, Ok(serde_json::json!({ "status": "success" })));
    let api = client(&mock, onboarded("user"));

    api.submit_review(&Review { item_id: 7, item_type: ItemKind::Movie, rating: 4, review: "good".into() })
        .await
        .unwrap();

    let body = mock.calls_to(REVIEWS_PATH)[0].body.clone().unwrap();
    assert_eq!(body, serde_json::json!({ "itemId": 7, "itemType": "movie", "rating": 4, "review": "good" }));
}

#[tokio::test]
async fn item_actions_target_collection_paths() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::DELETE, "/api/books/42", Ok(serde_json::Value::Null));
    mock.on(Method::PUT, "/api/movies/7", Ok(serde_json::Value::Null));
    let api = client(&mock, onboarded("user"));

    api.delete_item(ItemKind::Book, 42).await.unwrap();
    api.update_item(ItemKind::Movie, 7, &serde_json::json!({ "rating": 5 })).await.unwrap();

    assert_eq!(item_path(ItemKind::Book, 42), "/api/books/42");
    assert_eq!(mock.calls().len(), 2);
}

#[tokio::test]
async fn recommendations_pass_tab_and_default_to_empty() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, RECOMMENDATIONS_PATH, Ok(serde_json::json!({ "status": "success" })));
    let api = client(&mock, onboarded("user"));

    assert!(api.recommendations(Tab::Movies).await.unwrap().is_empty());
    assert_eq!(mock.calls()[0].query_param("type"), Some("movies"));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, USER_PATH, Ok(serde_json::json!({ "nope": true })));
    let api = client(&mock, SessionState::logged_out());

    assert!(matches!(api.current_user().await, Err(ApiError::Decode(_))));
}

// =============================================================
// Interceptor policy
// =============================================================

#[tokio::test]
async fn unauthorized_on_data_endpoint_forces_logout() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, LISTINGS_PATH, Err(unauthorized()));
    mock.on(Method::GET, LOGOUT_PATH, Ok(serde_json::Value::Null));
    let api = client(&mock, onboarded("user"));
    let mut routes = api.navigator().subscribe();

    let query = ListingQuery {
        kind: None,
        search_global: false,
        query: String::new(),
        page: 1,
        per_page: 12,
    };
    let err = api.listings(&query).await;

    assert!(matches!(err, Err(ApiError::Unauthorized { .. })));
    assert_eq!(next_route(&mut routes).await, Route::Login);
    assert_eq!(api.store().snapshot(), SessionState::logged_out());
    assert_eq!(mock.calls_to(LOGOUT_PATH).len(), 1);
}

#[tokio::test]
async fn forced_logout_resets_even_when_logout_call_fails() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, ONBOARDING_STATUS_PATH, Err(unauthorized()));
    mock.on(Method::GET, LOGOUT_PATH, Err(network_down()));
    let api = client(&mock, onboarded("user"));
    let mut routes = api.navigator().subscribe();

    assert!(api.onboarding_status().await.is_err());
    assert_eq!(next_route(&mut routes).await, Route::Login);
    assert!(!api.store().snapshot().is_logged_in());
}

#[tokio::test]
async fn unauthorized_on_user_check_is_left_alone() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, USER_PATH, Err(unauthorized()));
    let api = client(&mock, onboarded("user"));

    assert!(api.current_user().await.is_err());
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    assert!(api.store().snapshot().is_logged_in());
    assert!(mock.calls_to(LOGOUT_PATH).is_empty());
}

#[tokio::test]
async fn forbidden_redirects_user_home() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, "/api/movies", Err(forbidden()));
    let api = client(&mock, onboarded("user"));
    let mut routes = api.navigator().subscribe();

    let movie = NewMovie {
        id: 1,
        title: "Heat".into(),
        director: "Michael Mann".into(),
        cast: "Al Pacino".into(),
        release_date: "1995-12-15".into(),
        original_language: "en".into(),
        genres: "Crime".into(),
        poster_path: None,
    };
    assert!(matches!(api.add_movie(&movie).await, Err(ApiError::Forbidden { .. })));
    assert_eq!(next_route(&mut routes).await, Route::Home);
    assert!(api.store().snapshot().is_logged_in());
}

#[tokio::test]
async fn forbidden_redirects_admin_to_admin() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, RECOMMENDATIONS_PATH, Err(forbidden()));
    let api = client(&mock, onboarded("admin"));
    let mut routes = api.navigator().subscribe();

    assert!(api.recommendations(Tab::All).await.is_err());
    assert_eq!(next_route(&mut routes).await, Route::Admin);
}

#[tokio::test]
async fn other_errors_do_not_navigate() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::POST,
        REVIEWS_PATH,
        Err(ApiError::Status { status: 400, message: "Item already added".into() }),
    );
    let api = client(&mock, onboarded("user"));
    let routes = api.navigator().subscribe();

    let err = api
        .submit_review(&Review { item_id: 1, item_type: ItemKind::Book, rating: 3, review: String::new() })
        .await
        .unwrap_err();
    tokio::task::yield_now().await;

    assert_eq!(err.user_message(), "Item already added");
    assert!(!routes.has_changed().unwrap());
}
