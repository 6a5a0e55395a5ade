//! Shared session handle
//!
//! Couples the published [`SessionState`] with the persisted token slot. The
//! two compound mutations, establishing and tearing down a session, run under
//! one lock so the stored token and the published state never disagree, no
//! matter whether the caller is an explicit logout or a 401 observed deep in
//! the HTTP layer.

use std::sync::Arc;

use parking_lot::Mutex;
use portico_model::User;

use crate::domains::auth::errors::{ClientResult, StorageError};
use crate::domains::auth::state_types::{SessionState, SessionStore};
use crate::infra::storage::TokenStore;

#[derive(Clone, Debug)]
pub struct SessionHandle {
    store: SessionStore,
    tokens: Arc<dyn TokenStore>,
    transition: Arc<Mutex<()>>,
}

impl SessionHandle {
    pub fn new(store: SessionStore, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            tokens,
            transition: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn state(&self) -> SessionState {
        self.store.current()
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Token currently persisted, if any
    pub fn stored_token(&self) -> Result<Option<String>, StorageError> {
        self.tokens.load()
    }

    /// Persist `token` and publish `Authenticated(user)`.
    ///
    /// If the token cannot be written, the state is left untouched.
    pub fn establish(&self, token: &str, user: User) -> ClientResult<()> {
        let _guard = self.transition.lock();
        self.tokens.save(token)?;
        self.store.set(SessionState::Authenticated(user));
        Ok(())
    }

    /// Resolve `Loading` with the bootstrap outcome.
    ///
    /// `Some(user)` keeps the token already on disk; `None` deletes it. If the
    /// session already left `Loading` (a login or a 401 got there first) the
    /// outcome is stale and nothing changes. Returns whether it was applied.
    pub(crate) fn resolve_bootstrap(&self, outcome: Option<User>) -> bool {
        let _guard = self.transition.lock();
        if !self.store.is_loading() {
            log::debug!("[Session] Bootstrap outcome dropped, session already resolved");
            return false;
        }
        match outcome {
            Some(user) => self.store.set(SessionState::Authenticated(user)),
            None => {
                if let Err(e) = self.tokens.clear() {
                    log::warn!("[Session] Failed to remove persisted token: {}", e);
                }
                self.store.set(SessionState::Anonymous);
            }
        }
        true
    }

    /// Delete the persisted token and publish `Anonymous`.
    ///
    /// A failing delete is logged; the session still ends.
    pub fn teardown(&self) {
        let _guard = self.transition.lock();
        if let Err(e) = self.tokens.clear() {
            log::warn!("[Session] Failed to remove persisted token: {}", e);
        }
        self.store.set(SessionState::Anonymous);
    }
}
