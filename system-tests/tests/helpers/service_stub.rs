// system-tests/tests/helpers/service_stub.rs
// ============================================================================
// Module: Account Service Stub
// Description: In-process HTTP account service for system-tests.
// Purpose: Exercise register, login, and delete-self over real HTTP.
// Dependencies: axum, serde, serde_json, tokio
// ============================================================================

use std::collections::HashMap;
use std::collections::HashSet;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::thread;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::delete;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const DELETE_SELF_PATH: &str = "/api/users/me";

/// Request observed by the stub, with the status it answered.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct StubRequest {
    pub method: String,
    pub path: String,
    pub status: u16,
}

#[derive(Default)]
struct StubState {
    /// Identifier to secret.
    accounts: HashMap<String, String>,
    /// Token to identifier.
    sessions: HashMap<String, String>,
    next_token: u64,
    failing_deletes: HashSet<String>,
    /// Requests still to be answered with 503, whatever the route.
    transient_failures: usize,
    requests: Vec<StubRequest>,
}

impl StubState {
    fn answer(&mut self, method: &str, path: &str, status: StatusCode) -> StatusCode {
        self.requests.push(StubRequest {
            method: method.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
        });
        status
    }

    fn take_transient(&mut self) -> bool {
        if self.transient_failures == 0 {
            return false;
        }
        self.transient_failures -= 1;
        true
    }
}

type SharedState = Arc<Mutex<StubState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for the stub account service.
pub struct ServiceStubHandle {
    base_url: String,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl ServiceStubHandle {
    /// Returns the service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an account directly, as an earlier run would have.
    pub fn insert_account(&self, identifier: &str, secret: &str) {
        lock(&self.state).accounts.insert(identifier.to_string(), secret.to_string());
    }

    pub fn account_exists(&self, identifier: &str) -> bool {
        lock(&self.state).accounts.contains_key(identifier)
    }

    pub fn account_count(&self) -> usize {
        lock(&self.state).accounts.len()
    }

    /// Makes delete-self for `identifier` answer 500.
    pub fn fail_delete_for(&self, identifier: &str) {
        lock(&self.state).failing_deletes.insert(identifier.to_string());
    }

    /// Answers the next `count` requests with 503.
    pub fn fail_next(&self, count: usize) {
        lock(&self.state).transient_failures = count;
    }

    /// Returns captured requests.
    pub fn requests(&self) -> Vec<StubRequest> {
        lock(&self.state).requests.clone()
    }

    /// Captured requests for one route.
    pub fn requests_to(&self, path: &str) -> Vec<StubRequest> {
        self.requests().into_iter().filter(|request| request.path == path).collect()
    }
}

impl Drop for ServiceStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns the stub on an ephemeral loopback port.
pub fn spawn_service_stub() -> Result<ServiceStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("service stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("service stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("service stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}");

    let state: SharedState = Arc::new(Mutex::new(StubState::default()));
    let app = Router::new()
        .route(REGISTER_PATH, post(register))
        .route(LOGIN_PATH, post(login))
        .route(DELETE_SELF_PATH, delete(delete_self))
        .with_state(Arc::clone(&state));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(ServiceStubHandle {
        base_url,
        state,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    email: String,
    password: String,
    confirm_password: String,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn register(State(state): State<SharedState>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = lock(&state);
    if state.take_transient() {
        return state.answer("POST", REGISTER_PATH, StatusCode::SERVICE_UNAVAILABLE).into_response();
    }
    let invalid = body.password != body.confirm_password
        || body.first_name.is_empty()
        || body.last_name.is_empty();
    if invalid {
        return state.answer("POST", REGISTER_PATH, StatusCode::BAD_REQUEST).into_response();
    }
    if state.accounts.contains_key(&body.email) {
        return state.answer("POST", REGISTER_PATH, StatusCode::CONFLICT).into_response();
    }
    state.accounts.insert(body.email.clone(), body.password);
    let status = state.answer("POST", REGISTER_PATH, StatusCode::CREATED);
    (status, Json(json!({ "email": body.email }))).into_response()
}

async fn login(State(state): State<SharedState>, Json(body): Json<LoginBody>) -> Response {
    let mut state = lock(&state);
    if state.take_transient() {
        return state.answer("POST", LOGIN_PATH, StatusCode::SERVICE_UNAVAILABLE).into_response();
    }
    if state.accounts.get(&body.email) != Some(&body.password) {
        let status = state.answer("POST", LOGIN_PATH, StatusCode::UNAUTHORIZED);
        return (status, Json(json!({ "message": "invalid credentials" }))).into_response();
    }
    state.next_token += 1;
    let token = format!("stub-token-{}", state.next_token);
    state.sessions.insert(token.clone(), body.email);
    let status = state.answer("POST", LOGIN_PATH, StatusCode::OK);
    (status, Json(json!({ "accessToken": token }))).into_response()
}

async fn delete_self(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if state.take_transient() {
        return state
            .answer("DELETE", DELETE_SELF_PATH, StatusCode::SERVICE_UNAVAILABLE)
            .into_response();
    }
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let Some(identifier) = token.and_then(|token| state.sessions.get(token).cloned()) else {
        return state.answer("DELETE", DELETE_SELF_PATH, StatusCode::UNAUTHORIZED).into_response();
    };
    if state.failing_deletes.contains(&identifier) {
        return state
            .answer("DELETE", DELETE_SELF_PATH, StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }
    state.accounts.remove(&identifier);
    state.sessions.retain(|_, owner| *owner != identifier);
    state.answer("DELETE", DELETE_SELF_PATH, StatusCode::NO_CONTENT).into_response()
}
