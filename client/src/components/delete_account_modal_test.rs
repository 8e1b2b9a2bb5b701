use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use super::*;
use crate::net::api::{ACCOUNT_PATH, ApiClient};
use crate::net::mock::MockTransport;
use crate::net::types::User;
use crate::router::Navigator;
use crate::state::auth::{SessionState, SessionStore};

fn auth(mock: &Arc<MockTransport>) -> AuthService {
    let store = SessionStore::with_state(SessionState::authenticated(User {
        display_name: "Ada".into(),
        email: "ada@example.test".into(),
        role: "user".into(),
        is_new_user: false,
        onboarding_completed: true,
    }));
    let navigator = Navigator::new(store.clone());
    AuthService::new(ApiClient::new(mock.clone(), store, navigator))
}

#[test]
fn confirmation_is_case_insensitive_and_exact() {
    let mut dialog = DeleteAccountDialog::new();
    assert!(!dialog.can_delete());

    dialog.set_confirm_text("DeLeTe");
    assert!(dialog.can_delete());

    dialog.set_confirm_text("delete me");
    assert!(!dialog.can_delete());
}

#[tokio::test]
async fn unconfirmed_dialog_sends_nothing() {
    let mock = Arc::new(MockTransport::new());
    let auth = auth(&mock);
    let mut dialog = DeleteAccountDialog::new();
    dialog.set_confirm_text("remove");

    assert_eq!(dialog.confirm(&auth).await, Ok(None));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn confirmed_delete_logs_out() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::DELETE, ACCOUNT_PATH, Ok(json!({ "status": "success" })));
    let auth = auth(&mock);
    let mut dialog = DeleteAccountDialog::new();
    dialog.set_confirm_text("delete");

    assert_eq!(dialog.confirm(&auth).await, Ok(Some(Route::Login)));
    assert!(!dialog.is_pending());
    assert!(!auth.api().store().snapshot().is_logged_in());
}

#[tokio::test]
async fn failed_delete_keeps_message() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::DELETE,
        ACCOUNT_PATH,
        Err(ApiError::Status { status: 500, message: "Could not delete account".into() }),
    );
    let auth = auth(&mock);
    let mut dialog = DeleteAccountDialog::new();
    dialog.set_confirm_text("delete");

    assert!(dialog.confirm(&auth).await.is_err());
    assert_eq!(dialog.error(), Some("Could not delete account"));
    assert!(dialog.can_delete());
    assert!(auth.api().store().snapshot().is_logged_in());
}
