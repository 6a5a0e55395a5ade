// Each test binary uses a different subset of the harness
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use portico_client::app::App;
use portico_client::infra::config::Config;
use portico_client::infra::storage::TokenStore;
use portico_model::routes::api;
use portico_model::{
    AuthResponse, CreateUserRequest, LoginRequest, LoginResponse, Timestamp,
    UpdateUserStatusRequest, User, UserId,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpass1";
pub const ALICE: &str = "alice";
pub const ALICE_PASSWORD: &str = "goodpass";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    next_id: UserId,
    issued: u64,
    requests: Vec<RecordedRequest>,
}

/// In-memory stand-in for the admin API
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    inner: Arc<Mutex<Inner>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// admin (superuser), alice (enabled) and carol (disabled)
    pub fn seeded() -> Self {
        Self::new()
            .with_user(ADMIN, ADMIN_PASSWORD, true, true)
            .with_user(ALICE, ALICE_PASSWORD, false, true)
            .with_user("carol", "carolpass", false, false)
    }

    pub fn with_user(
        self,
        username: &str,
        password: &str,
        superuser: bool,
        enabled: bool,
    ) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let mut user = User::new(inner.next_id, username);
            user.email = Some(format!("{username}@example.com"));
            user.enabled = Some(enabled);
            user.is_superuser = Some(superuser);
            user.created_at = Timestamp::parse("2024-03-01T09:30:00");
            inner.accounts.push(Account {
                user,
                password: password.to_string(),
            });
        }
        self
    }

    /// Issue a session token directly, as if a login happened earlier
    pub fn issue_token(&self, username: &str) -> String {
        let mut inner = self.inner.lock();
        let id = inner
            .accounts
            .iter()
            .find(|a| a.user.username == username)
            .map(|a| a.user.id)
            .expect("known user");
        issue(&mut inner, id)
    }

    /// Server-side expiry of every session
    pub fn revoke_all_tokens(&self) {
        self.inner.lock().tokens.clear();
    }

    pub fn active_tokens(&self) -> usize {
        self.inner.lock().tokens.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<RecordedRequest> {
        self.inner
            .lock()
            .requests
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.inner
            .lock()
            .accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
    }

    fn record(&self, method: Method, path: &str, headers: &HeaderMap) -> Option<UserId> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut inner = self.inner.lock();
        let caller = authorization
            .as_deref()
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| inner.tokens.get(token).copied());
        inner.requests.push(RecordedRequest {
            method,
            path: path.to_string(),
            authorization,
        });
        caller
    }

    fn router(self) -> Router {
        Router::new()
            .route(api::auth::LOGIN, post(login))
            .route(api::auth::LOGOUT, post(logout))
            .route(api::auth::CURRENT, get(current_user))
            .route(api::users::COLLECTION, get(list_users).post(create_user))
            .route(api::users::STATUS, patch(update_status))
            .with_state(self)
    }
}

fn issue(inner: &mut Inner, id: UserId) -> String {
    inner.issued += 1;
    let token = format!("token-{}-{}", id, inner.issued);
    inner.tokens.insert(token.clone(), id);
    token
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

fn find_user(inner: &Inner, id: UserId) -> Option<User> {
    inner
        .accounts
        .iter()
        .find(|a| a.user.id == id)
        .map(|a| a.user.clone())
}

/// Resolve the caller and require superuser rights
fn admin_only(api: &FakeApi, caller: Option<UserId>) -> Result<(), Response> {
    let caller = caller.ok_or_else(unauthorized)?;
    let inner = api.inner.lock();
    match find_user(&inner, caller) {
        Some(user) if user.is_superuser() => Ok(()),
        Some(_) => Err((StatusCode::FORBIDDEN, "Admin access required").into_response()),
        None => Err(unauthorized()),
    }
}

async fn login(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Response {
    api.record(Method::POST, api::auth::LOGIN, &headers);
    let mut inner = api.inner.lock();
    let user = inner
        .accounts
        .iter()
        .find(|a| a.user.username == req.username && a.password == req.password)
        .filter(|a| a.user.is_enabled())
        .map(|a| a.user.clone());
    match user {
        Some(user) => {
            let token = issue(&mut inner, user.id);
            Json(LoginResponse { token, user }).into_response()
        }
        None => (StatusCode::UNAUTHORIZED, "Invalid username or password").into_response(),
    }
}

async fn logout(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    if api.record(Method::POST, api::auth::LOGOUT, &headers).is_none() {
        return unauthorized();
    }
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    if let Some(token) = token {
        api.inner.lock().tokens.remove(&token);
    }
    StatusCode::OK.into_response()
}

async fn current_user(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let Some(caller) = api.record(Method::GET, api::auth::CURRENT, &headers) else {
        return unauthorized();
    };
    let inner = api.inner.lock();
    match find_user(&inner, caller) {
        Some(user) => Json(AuthResponse { user }).into_response(),
        None => unauthorized(),
    }
}

async fn list_users(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let caller = api.record(Method::GET, api::users::COLLECTION, &headers);
    if let Err(response) = admin_only(&api, caller) {
        return response;
    }
    let users: Vec<User> = api
        .inner
        .lock()
        .accounts
        .iter()
        .map(|a| a.user.clone())
        .collect();
    Json(users).into_response()
}

async fn create_user(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Response {
    let caller = api.record(Method::POST, api::users::COLLECTION, &headers);
    if let Err(response) = admin_only(&api, caller) {
        return response;
    }
    let mut inner = api.inner.lock();
    if inner.accounts.iter().any(|a| a.user.username == req.username) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Username already exists" })),
        )
            .into_response();
    }
    if req.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters",
        )
            .into_response();
    }
    inner.next_id += 1;
    let mut user = User::new(inner.next_id, req.username);
    user.email = req.email;
    user.enabled = Some(true);
    user.is_superuser = Some(false);
    user.created_at = Timestamp::parse("2024-06-01T12:00:00");
    inner.accounts.push(Account {
        user: user.clone(),
        password: req.password,
    });
    Json(user).into_response()
}

async fn update_status(
    State(api): State<FakeApi>,
    Path(id): Path<UserId>,
    headers: HeaderMap,
    Json(req): Json<UpdateUserStatusRequest>,
) -> Response {
    let path = format!("/api/users/{id}/status");
    let caller = api.record(Method::PATCH, &path, &headers);
    if let Err(response) = admin_only(&api, caller) {
        return response;
    }
    let mut inner = api.inner.lock();
    let Some(account) = inner.accounts.iter_mut().find(|a| a.user.id == id) else {
        return (StatusCode::NOT_FOUND, "User not found").into_response();
    };
    if account.user.is_superuser() && !req.enabled {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Cannot disable superuser" })),
        )
            .into_response();
    }
    account.user.enabled = Some(req.enabled);
    let user = account.user.clone();
    if !req.enabled {
        inner.tokens.retain(|_, owner| *owner != id);
    }
    Json(user).into_response()
}

/// A fake API bound to an ephemeral local port
#[derive(Debug)]
pub struct TestServer {
    pub base_url: String,
    pub api: FakeApi,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(api: FakeApi) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let router = api.clone().router();
        let task = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        Self {
            base_url: format!("http://{addr}"),
            api,
            task,
        }
    }

    pub fn config(&self) -> Config {
        Config::default().with_api_base_url(self.base_url.clone())
    }

    pub fn app(&self, tokens: Arc<dyn TokenStore>) -> App {
        App::new(self.config(), tokens).expect("app")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
