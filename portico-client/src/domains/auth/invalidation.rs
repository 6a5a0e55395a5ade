use log::{debug, info};

use crate::domains::auth::session::SessionHandle;
use crate::domains::ui::routing::{Navigator, Route};
use crate::infra::api_client::SessionInvalidation;

/// Reacts to a 401 from the API: ends the session and sends the user to the
/// login entry point. While the user is already on the login entry point
/// nothing happens, so failed logins cannot cause redirect loops.
#[derive(Debug, Clone)]
pub struct SessionInvalidator {
    session: SessionHandle,
    navigator: Navigator,
}

impl SessionInvalidator {
    pub fn new(session: SessionHandle, navigator: Navigator) -> Self {
        Self { session, navigator }
    }
}

impl SessionInvalidation for SessionInvalidator {
    fn invalidate(&self) {
        if self.navigator.is_at(Route::Login) {
            debug!("[Session] 401 on the login route, leaving session alone");
            return;
        }
        info!("[Session] API rejected the session, signing out");
        self.session.teardown();
        self.navigator.navigate(Route::Login);
    }
}
