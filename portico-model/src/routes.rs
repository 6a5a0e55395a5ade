macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

/// Route definitions for the admin API
pub mod api {
    pub const ROOT: &str = "/api";

    pub mod auth {
        pub const LOGIN: &str = api_path!("/auth/login");
        pub const LOGOUT: &str = api_path!("/auth/logout");
        pub const CURRENT: &str = api_path!("/auth/me");
    }

    pub mod users {
        pub const COLLECTION: &str = api_path!("/users");
        pub const STATUS: &str = api_path!("/users/{id}/status");
    }
}

pub mod utils {
    /// Replace a single `{param}` placeholder in a route.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }
}
