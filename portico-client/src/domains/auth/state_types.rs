//! Session state machine
//!
//! `Loading` resolves exactly once into `Authenticated` or `Anonymous`;
//! afterwards the session only moves between those two. The state is
//! published on a watch channel so every consumer observes each transition.

use std::sync::Arc;

use portico_model::User;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup bootstrap has not resolved yet
    Loading,

    /// No authenticated user
    Anonymous,

    /// A user is signed in
    Authenticated(User),
}

impl SessionState {
    /// True iff a user is held
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }
}

/// Thread-safe session state store using a watch channel
#[derive(Clone, Debug)]
pub struct SessionStore {
    sender: Arc<watch::Sender<SessionState>>,
    receiver: watch::Receiver<SessionState>,
}

impl SessionStore {
    /// Fresh store in the `Loading` state
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(SessionState::Loading);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn current(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.receiver.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().is_loading()
    }

    pub fn current_user(&self) -> Option<User> {
        self.receiver.borrow().user().cloned()
    }

    /// Access state without cloning
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        f(&self.receiver.borrow())
    }

    /// Subscribe to session transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.receiver.clone()
    }

    pub(crate) fn set(&self, state: SessionState) {
        // send_replace never fails, even with no receivers left
        let previous = self.sender.send_replace(state);
        log::info!(
            "[Session] {} -> {}",
            Self::label(&previous),
            Self::label(&self.receiver.borrow())
        );
    }

    fn label(state: &SessionState) -> &'static str {
        match state {
            SessionState::Loading => "Loading",
            SessionState::Anonymous => "Anonymous",
            SessionState::Authenticated(_) => "Authenticated",
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
