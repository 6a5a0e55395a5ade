//! Authentication service trait and implementations

use std::sync::Arc;

use async_trait::async_trait;
use portico_model::routes::api;
use portico_model::{AuthResponse, LoginRequest, LoginResponse, User};

use crate::domains::auth::errors::{AuthError, ClientError, ClientResult, ServerError};
use crate::infra::api_client::ApiClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a token and the user it belongs to.
    ///
    /// Rejected credentials surface as [`AuthError::InvalidCredentials`].
    async fn login(&self, request: LoginRequest) -> ClientResult<LoginResponse>;

    /// Tell the server the given token is done. Best-effort.
    async fn logout(&self, token: &str) -> ClientResult<()>;

    /// Identify the user behind the persisted token
    async fn get_current_user(&self) -> ClientResult<User>;
}

#[derive(Clone, Debug)]
pub struct AuthApiAdapter {
    client: Arc<ApiClient>,
}

impl AuthApiAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthService for AuthApiAdapter {
    async fn login(&self, request: LoginRequest) -> ClientResult<LoginResponse> {
        self.client
            .post(api::auth::LOGIN, &request)
            .await
            .map_err(|err| match err {
                ClientError::Auth(_)
                | ClientError::Server(ServerError { status: 400, .. }) => {
                    AuthError::InvalidCredentials.into()
                }
                other => other,
            })
    }

    async fn logout(&self, token: &str) -> ClientResult<()> {
        self.client.post_empty_with_token(api::auth::LOGOUT, token).await
    }

    async fn get_current_user(&self) -> ClientResult<User> {
        let response: AuthResponse = self.client.get(api::auth::CURRENT).await?;
        Ok(response.user)
    }
}
