//! Session lifecycle: bootstrap, login and logout

use std::sync::Arc;

use log::{info, warn};
use portico_model::{LoginRequest, LoginResponse, User};
use tokio::sync::{OnceCell, watch};
use tokio::task::JoinHandle;

use crate::domains::auth::errors::ClientResult;
use crate::domains::auth::session::SessionHandle;
use crate::domains::auth::state_types::SessionState;
use crate::infra::services::auth::AuthService;

/// Owns the session transitions that the application initiates itself.
///
/// 401-driven teardown arrives through
/// [`SessionInvalidator`](crate::domains::auth::invalidation::SessionInvalidator),
/// which shares the same [`SessionHandle`] and therefore the same mutation path.
pub struct SessionManager {
    session: SessionHandle,
    auth: Arc<dyn AuthService>,
    bootstrapped: OnceCell<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.session)
            .field("bootstrapped", &self.bootstrapped.initialized())
            .finish()
    }
}

impl SessionManager {
    pub fn new(session: SessionHandle, auth: Arc<dyn AuthService>) -> Self {
        Self {
            session,
            auth,
            bootstrapped: OnceCell::new(),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.store().current_user()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.store().subscribe()
    }

    /// Resolve `Loading` using the persisted token. Runs at most once;
    /// later and concurrent calls wait for the first and return its result.
    pub async fn bootstrap(&self) -> SessionState {
        self.bootstrapped
            .get_or_init(|| self.run_bootstrap())
            .await;
        self.session.state()
    }

    async fn run_bootstrap(&self) {
        let token = match self.session.stored_token() {
            Ok(token) => token,
            Err(e) => {
                warn!("[Session] Token slot unreadable during bootstrap: {}", e);
                None
            }
        };

        if token.is_none() {
            info!("[Session] No persisted token, starting anonymous");
            self.session.resolve_bootstrap(None);
            return;
        }

        match self.auth.get_current_user().await {
            Ok(user) => {
                info!("[Session] Restored session for '{}'", user.username);
                self.session.resolve_bootstrap(Some(user));
            }
            Err(e) => {
                info!("[Session] Persisted token rejected: {}", e);
                self.session.resolve_bootstrap(None);
            }
        }
    }

    /// Authenticate and persist the issued token.
    ///
    /// On failure the session is unchanged and the error goes to the caller.
    pub async fn login(&self, credentials: LoginRequest) -> ClientResult<User> {
        let username = credentials.username.clone();
        let LoginResponse { token, user } = self.auth.login(credentials).await?;
        self.session.establish(&token, user.clone())?;
        info!("[Session] '{}' logged in", username);
        Ok(user)
    }

    /// End the session locally, then notify the server in the background.
    ///
    /// Teardown never waits on the server. Returns the handle of the
    /// notification task when one was spawned.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let token = self.session.stored_token().ok().flatten();
        self.session.teardown();
        info!("[Session] Logged out");

        let token = token?;
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("[Session] No runtime available, skipping server-side logout");
                return None;
            }
        };
        let auth = Arc::clone(&self.auth);
        Some(runtime.spawn(async move {
            if let Err(e) = auth.logout(&token).await {
                warn!("[Session] Server-side logout failed (ignored): {}", e);
            }
        }))
    }
}
