use std::time::Duration;

use reqwest::Method;

use super::*;
use crate::net::api::{ACCOUNT_PATH, CALLBACK_PATH, COMPLETE_ONBOARDING_PATH, LOGOUT_PATH, USER_PATH};
use crate::net::mock::{MockTransport, network_down, unauthorized, user_json};
use crate::router::Navigator;

fn service(mock: &Arc<MockTransport>, state: SessionState) -> AuthService {
    let store = SessionStore::with_state(state);
    let navigator = Navigator::new(store.clone());
    AuthService::new(ApiClient::new(mock.clone(), store, navigator))
}

fn user(role: &str, is_new_user: bool, onboarding_completed: bool) -> User {
    User {
        display_name: "Ada".into(),
        email: "ada@example.test".into(),
        role: role.into(),
        is_new_user,
        onboarding_completed,
    }
}

// =============================================================
// landing_route
// =============================================================

#[test]
fn landing_route_by_role_and_onboarding() {
    assert_eq!(landing_route(&user("admin", true, false)), Route::Admin);
    assert_eq!(landing_route(&user("user", true, false)), Route::Welcome);
    assert_eq!(landing_route(&user("user", false, false)), Route::Welcome);
    assert_eq!(landing_route(&user("user", false, true)), Route::Home);
}

// =============================================================
// check_status
// =============================================================

#[tokio::test]
async fn check_status_success_sets_authenticated() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, USER_PATH, Ok(user_json("admin", false, true)));
    let auth = service(&mock, SessionState::initial());

    let state = auth.check_status().await;

    assert!(state.is_logged_in());
    assert!(state.is_admin());
    assert!(!state.is_loading());
    assert_eq!(state.user().map(|u| u.display_name.as_str()), Some("Ada"));
}

#[tokio::test]
async fn check_status_failure_logs_out() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, USER_PATH, Err(unauthorized()));
    let auth = service(&mock, SessionState::initial());

    assert_eq!(auth.check_status().await, SessionState::logged_out());
}

#[tokio::test(start_paused = true)]
async fn check_status_is_coalesced_while_in_flight() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(Method::GET, USER_PATH, Duration::from_millis(50), Ok(user_json("user", false, true)));
    let auth = service(&mock, SessionState::initial());

    let first = tokio::spawn({
        let auth = auth.clone();
        async move { auth.check_status().await }
    });
    tokio::task::yield_now().await;

    let second = auth.check_status().await;
    assert!(second.is_loading());

    let first = first.await.unwrap();
    assert!(first.is_logged_in());
    assert_eq!(mock.calls_to(USER_PATH).len(), 1);

    // The flag clears afterwards, so a later check hits the backend again.
    auth.check_status().await;
    assert_eq!(mock.calls_to(USER_PATH).len(), 2);
}

#[tokio::test]
async fn check_status_skipped_while_callback_processing() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, USER_PATH, Err(unauthorized()));
    let auth = service(&mock, SessionState::initial());

    auth.mark_callback_processing();
    let state = auth.check_status().await;

    assert!(state.is_loading());
    assert!(mock.calls_to(USER_PATH).is_empty());
}

#[tokio::test(start_paused = true)]
async fn check_status_failure_during_callback_leaves_state() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(Method::GET, USER_PATH, Duration::from_millis(50), Err(unauthorized()));
    mock.on_delayed(Method::POST, CALLBACK_PATH, Duration::from_millis(10), Ok(user_json("user", false, true)));
    let auth = service(&mock, SessionState::initial());

    let check = tokio::spawn({
        let auth = auth.clone();
        async move { auth.check_status().await }
    });
    tokio::task::yield_now().await;
    // Callback still running when the check fails.
    let callback = tokio::spawn({
        let auth = auth.clone();
        async move {
            auth.mark_callback_processing();
            tokio::time::sleep(Duration::from_millis(100)).await;
            auth.handle_callback("code", "state").await
        }
    });
    tokio::task::yield_now().await;

    let during = check.await.unwrap();
    assert!(!during.is_logged_in());
    assert_eq!(callback.await.unwrap(), Route::Home);
    assert!(auth.api().store().snapshot().is_logged_in());
}

// =============================================================
// handle_callback
// =============================================================

#[tokio::test]
async fn callback_routes_new_user_to_welcome() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, CALLBACK_PATH, Ok(user_json("user", true, false)));
    let auth = service(&mock, SessionState::initial());

    assert_eq!(auth.handle_callback("code", "state").await, Route::Welcome);
    let state = auth.api().store().snapshot();
    assert!(state.is_logged_in());
    assert!(!state.is_loading());
}

#[tokio::test]
async fn callback_routes_admin_to_admin() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, CALLBACK_PATH, Ok(user_json("admin", false, true)));
    let auth = service(&mock, SessionState::initial());

    assert_eq!(auth.handle_callback("code", "state").await, Route::Admin);
    assert!(auth.api().store().is_admin());
}

#[tokio::test]
async fn callback_failure_logs_out_and_routes_to_login() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::POST,
        CALLBACK_PATH,
        Err(crate::net::error::ApiError::Status { status: 400, message: "Invalid state".into() }),
    );
    let auth = service(&mock, SessionState::initial());

    assert_eq!(auth.handle_callback("code", "bad").await, Route::Login);
    assert_eq!(auth.api().store().snapshot(), SessionState::logged_out());
}

#[tokio::test]
async fn callback_clears_processing_flag() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, CALLBACK_PATH, Ok(user_json("user", false, true)));
    mock.on(Method::GET, USER_PATH, Ok(user_json("user", false, true)));
    let auth = service(&mock, SessionState::initial());

    auth.mark_callback_processing();
    auth.handle_callback("code", "state").await;
    auth.check_status().await;

    assert_eq!(mock.calls_to(USER_PATH).len(), 1);
}

#[tokio::test]
async fn abandon_callback_settles_logged_out() {
    let mock = Arc::new(MockTransport::new());
    let auth = service(&mock, SessionState::initial());
    auth.mark_callback_processing();

    assert_eq!(auth.abandon_callback(), Route::Login);
    assert_eq!(auth.api().store().snapshot(), SessionState::logged_out());
    assert!(mock.calls().is_empty());
}

// =============================================================
// logout / delete_account
// =============================================================

#[tokio::test]
async fn logout_resets_even_on_network_failure() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, LOGOUT_PATH, Err(network_down()));
    let auth = service(&mock, SessionState::authenticated(user("user", false, true)));

    assert_eq!(auth.logout().await, Route::Login);
    assert_eq!(auth.api().store().snapshot(), SessionState::logged_out());
    assert_eq!(mock.calls_to(LOGOUT_PATH).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn logout_holds_loading_during_request() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(Method::GET, LOGOUT_PATH, Duration::from_millis(20), Ok(serde_json::Value::Null));
    let auth = service(&mock, SessionState::authenticated(user("user", false, true)));
    let rx = auth.api().store().subscribe();

    let task = tokio::spawn({
        let auth = auth.clone();
        async move { auth.logout().await }
    });
    tokio::task::yield_now().await;

    assert!(rx.borrow().is_loading());
    assert!(rx.borrow().is_logged_in());
    task.await.unwrap();
    assert!(!rx.borrow().is_loading());
}

#[tokio::test]
async fn delete_account_success_resets() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::DELETE, ACCOUNT_PATH, Ok(serde_json::json!({ "status": "success" })));
    let auth = service(&mock, SessionState::authenticated(user("user", false, true)));

    assert_eq!(auth.delete_account().await.unwrap(), Route::Login);
    assert_eq!(auth.api().store().snapshot(), SessionState::logged_out());
}

#[tokio::test]
async fn delete_account_failure_keeps_session() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::DELETE,
        ACCOUNT_PATH,
        Err(crate::net::error::ApiError::Status { status: 500, message: "boom".into() }),
    );
    let before = SessionState::authenticated(user("user", false, true));
    let auth = service(&mock, before.clone());

    assert!(auth.delete_account().await.is_err());
    assert_eq!(auth.api().store().snapshot(), before);
}

// =============================================================
// complete_onboarding
// =============================================================

#[tokio::test]
async fn complete_onboarding_patches_only_flags() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, COMPLETE_ONBOARDING_PATH, Ok(serde_json::json!({ "status": "success" })));
    let auth = service(&mock, SessionState::authenticated(user("user", true, false)));

    auth.complete_onboarding().await.unwrap();

    let expected = SessionState::authenticated(user("user", false, true));
    assert_eq!(auth.api().store().snapshot(), expected);
}

#[tokio::test]
async fn complete_onboarding_failure_leaves_user() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::POST, COMPLETE_ONBOARDING_PATH, Err(network_down()));
    let before = SessionState::authenticated(user("user", true, false));
    let auth = service(&mock, before.clone());

    assert!(auth.complete_onboarding().await.is_err());
    assert_eq!(auth.api().store().snapshot(), before);
}
