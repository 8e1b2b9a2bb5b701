//! Scripted [`Transport`] for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use super::error::ApiError;
use super::transport::{ApiRequest, Transport};

type Key = (Method, String);

#[derive(Clone, Debug)]
struct Scripted {
    response: Result<Value, ApiError>,
    delay: Option<Duration>,
}

/// Replays queued responses per `(method, path)`. The last queued response
/// for a key repeats forever; unscripted keys answer 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    scripts: Mutex<HashMap<Key, VecDeque<Scripted>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(&self, method: Method, path: &str, response: Result<Value, ApiError>) -> &Self {
        self.push(method, path, Scripted { response, delay: None })
    }

    /// Like [`Self::on`], but the response only arrives after `delay`.
    pub(crate) fn on_delayed(
        &self,
        method: Method,
        path: &str,
        delay: Duration,
        response: Result<Value, ApiError>,
    ) -> &Self {
        self.push(method, path, Scripted { response, delay: Some(delay) })
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> Vec<ApiRequest> {
        self.calls().into_iter().filter(|call| call.path == path).collect()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(scripted);
        self
    }

    fn next(&self, key: &Key) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(key)?;
        if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(request.clone());
        let key = (request.method.clone(), request.path.clone());
        let Some(scripted) = self.next(&key) else {
            return Err(ApiError::Status { status: 404, message: "Not found".into() });
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.response
    }
}

/// 401 as the backend sends it.
pub(crate) fn unauthorized() -> ApiError {
    ApiError::Unauthorized { message: "Not authenticated".into() }
}

pub(crate) fn forbidden() -> ApiError {
    ApiError::Forbidden { message: "Admin access required".into() }
}

pub(crate) fn network_down() -> ApiError {
    ApiError::Transport("connection refused".into())
}

pub(crate) fn user_json(role: &str, is_new_user: bool, onboarding_completed: bool) -> Value {
    serde_json::json!({
        "user": {
            "displayName": "Ada",
            "email": "ada@example.test",
            "role": role,
            "isNewUser": is_new_user,
            "onboardingCompleted": onboarding_completed,
        }
    })
}
