//! Application wiring
//!
//! Builds the shared session store, the navigator and the HTTP client once,
//! and hands every domain the same instances.

use std::sync::Arc;

use log::info;
use portico_model::{LoginRequest, User};
use tokio::task::JoinHandle;

use crate::domains::auth::errors::ClientResult;
use crate::domains::auth::invalidation::SessionInvalidator;
use crate::domains::auth::manager::SessionManager;
use crate::domains::auth::session::SessionHandle;
use crate::domains::auth::state_types::{SessionState, SessionStore};
use crate::domains::ui::routing::{GuardDecision, MenuItem, Navigator, Route, menu_items, resolve};
use crate::domains::users::view::UsersView;
use crate::infra::api_client::ApiClient;
use crate::infra::config::Config;
use crate::infra::services::{AuthApiAdapter, AuthService, UserAdminApiAdapter, UserAdminService};
use crate::infra::storage::{FileTokenStore, TokenStore};

#[derive(Debug)]
pub struct App {
    config: Config,
    navigator: Navigator,
    api: Arc<ApiClient>,
    session: SessionManager,
    users: UsersView,
}

impl App {
    pub fn new(config: Config, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let navigator = Navigator::default();
        let handle = SessionHandle::new(SessionStore::new(), tokens.clone());
        let invalidator = SessionInvalidator::new(handle.clone(), navigator.clone());
        let api = Arc::new(ApiClient::new(&config, tokens, Arc::new(invalidator))?);

        let auth: Arc<dyn AuthService> = Arc::new(AuthApiAdapter::new(api.clone()));
        let admin: Arc<dyn UserAdminService> =
            Arc::new(UserAdminApiAdapter::new(api.clone()));

        let session = SessionManager::new(handle, auth);
        let users = UsersView::new(admin, config.timestamp_format.clone());

        Ok(Self {
            config,
            navigator,
            api,
            session,
            users,
        })
    }

    /// Wire the app with the token slot in the configured data directory
    pub fn from_config(config: Config) -> ClientResult<Self> {
        let dir = config.resolve_data_dir()?;
        let tokens = FileTokenStore::new(&dir);
        info!("[Session] Token slot at {}", tokens.path().display());
        Self::new(config, Arc::new(tokens))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn users(&self) -> &UsersView {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut UsersView {
        &mut self.users
    }

    /// Resolve the persisted session. Safe to call repeatedly.
    pub async fn start(&self) -> SessionState {
        self.session.bootstrap().await
    }

    /// Move to `route` and apply the guard, redirecting to login when the
    /// session is anonymous.
    pub fn visit(&self, route: Route) -> GuardDecision {
        self.navigator.navigate(route);
        let decision = resolve(route, &self.session.state());
        if decision == GuardDecision::RedirectToLogin {
            self.navigator.navigate(Route::Login);
        }
        decision
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        let user = self.session.current_user();
        menu_items(user.as_ref())
    }

    /// Log in from the login entry point and land on the home route
    pub async fn login(&self, credentials: LoginRequest) -> ClientResult<User> {
        self.navigator.navigate(Route::Login);
        let user = self.session.login(credentials).await?;
        self.navigator.navigate(Route::Home);
        Ok(user)
    }

    /// End the session and return to the login entry point
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let notification = self.session.logout();
        self.navigator.navigate(Route::Login);
        notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryTokenStore;

    fn offline_app(tokens: MemoryTokenStore) -> App {
        let config = Config::default().with_api_base_url("http://127.0.0.1:9");
        App::new(config, Arc::new(tokens)).expect("app")
    }

    #[tokio::test]
    async fn anonymous_visit_redirects_to_login() {
        let app = offline_app(MemoryTokenStore::new());
        assert_eq!(app.start().await, SessionState::Anonymous);

        assert_eq!(app.visit(Route::Users), GuardDecision::RedirectToLogin);
        assert_eq!(app.navigator().current(), Route::Login);
    }

    #[test]
    fn visit_before_bootstrap_shows_placeholder() {
        let app = offline_app(MemoryTokenStore::new());
        assert_eq!(app.visit(Route::Home), GuardDecision::Placeholder);
        assert_eq!(app.navigator().current(), Route::Home);
    }

    #[test]
    fn login_route_is_never_guarded() {
        let app = offline_app(MemoryTokenStore::new());
        assert_eq!(app.visit(Route::Login), GuardDecision::Render);
    }

    #[tokio::test]
    async fn logout_navigates_to_login() {
        let app = offline_app(MemoryTokenStore::new());
        app.start().await;
        app.visit(Route::About);

        assert!(app.logout().is_none());
        assert_eq!(app.navigator().current(), Route::Login);
        assert_eq!(app.session().state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn anonymous_menu_has_no_admin_entry() {
        let app = offline_app(MemoryTokenStore::new());
        app.start().await;
        let routes: Vec<_> = app.menu().into_iter().map(|item| item.route).collect();
        assert_eq!(routes, vec![Route::Home, Route::About]);
    }
}
