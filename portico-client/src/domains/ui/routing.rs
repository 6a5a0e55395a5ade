//! Navigation, route protection and the main menu
//!
//! The [`Navigator`] is the single owner of the current location. The guard
//! is a pure function of [`SessionState`] so it can be evaluated on every
//! transition without side effects.

use std::fmt;
use std::sync::Arc;

use portico_model::User;
use tokio::sync::watch;

use crate::domains::auth::state_types::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    About,
    Users,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Login, Route::Home, Route::About, Route::Users];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::About => "/about",
            Route::Users => "/users",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Everything except the login entry point requires a session
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What a protected view should do for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap still running: render a placeholder, never the content
    Placeholder,
    /// No session: send the user to the login entry point
    RedirectToLogin,
    /// Render the wrapped content
    Render,
}

pub fn guard(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Placeholder,
        SessionState::Anonymous => GuardDecision::RedirectToLogin,
        SessionState::Authenticated(_) => GuardDecision::Render,
    }
}

/// Apply the guard to `route`; public routes always render
pub fn resolve(route: Route, state: &SessionState) -> GuardDecision {
    if route.is_protected() {
        guard(state)
    } else {
        GuardDecision::Render
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub route: Route,
    pub label: &'static str,
}

/// Navigation entries for the signed-in user. Users is superuser-only.
pub fn menu_items(user: Option<&User>) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem {
            route: Route::Home,
            label: "Home",
        },
        MenuItem {
            route: Route::About,
            label: "About",
        },
    ];
    if user.is_some_and(User::is_superuser) {
        items.push(MenuItem {
            route: Route::Users,
            label: "Users",
        });
    }
    items
}

/// Owner of the current location
#[derive(Clone, Debug)]
pub struct Navigator {
    sender: Arc<watch::Sender<Route>>,
    receiver: watch::Receiver<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (sender, receiver) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn current(&self) -> Route {
        *self.receiver.borrow()
    }

    pub fn is_at(&self, route: Route) -> bool {
        self.current() == route
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.sender.send_replace(route);
        if previous != route {
            log::debug!("[Navigator] {} -> {}", previous, route);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.receiver.clone()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_never_renders_while_loading() {
        assert_eq!(guard(&SessionState::Loading), GuardDecision::Placeholder);
        assert_eq!(guard(&SessionState::Anonymous), GuardDecision::RedirectToLogin);
        assert_eq!(
            guard(&SessionState::Authenticated(User::new(1, "alice"))),
            GuardDecision::Render
        );
    }

    #[test]
    fn login_route_is_public() {
        assert_eq!(resolve(Route::Login, &SessionState::Loading), GuardDecision::Render);
        assert_eq!(resolve(Route::Login, &SessionState::Anonymous), GuardDecision::Render);
        assert_eq!(
            resolve(Route::Users, &SessionState::Anonymous),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nowhere"), None);
    }

    #[test]
    fn users_menu_entry_requires_superuser() {
        let mut admin = User::new(1, "root");
        admin.is_superuser = Some(true);
        let regular = User::new(2, "alice");

        let labels = |user: Option<&User>| -> Vec<&str> {
            menu_items(user).into_iter().map(|m| m.label).collect()
        };

        assert_eq!(labels(Some(&admin)), vec!["Home", "About", "Users"]);
        assert_eq!(labels(Some(&regular)), vec!["Home", "About"]);
        assert_eq!(labels(None), vec!["Home", "About"]);
    }

    #[test]
    fn navigator_tracks_location() {
        let nav = Navigator::new(Route::Home);
        assert!(nav.is_at(Route::Home));
        nav.navigate(Route::Login);
        assert_eq!(nav.current(), Route::Login);
    }
}
