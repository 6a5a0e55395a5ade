use std::sync::Arc;

use async_trait::async_trait;
use portico_model::routes::{api, utils};
use portico_model::{CreateUserRequest, UpdateUserStatusRequest, User, UserId};

use crate::domains::auth::errors::ClientResult;
use crate::infra::api_client::ApiClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdminService: Send + Sync {
    /// List every user
    async fn list_users(&self) -> ClientResult<Vec<User>>;

    /// Create a new user
    async fn create_user(&self, req: CreateUserRequest) -> ClientResult<User>;

    /// Enable or disable an account
    async fn update_user_status(
        &self,
        user_id: UserId,
        req: UpdateUserStatusRequest,
    ) -> ClientResult<User>;
}

#[derive(Clone, Debug)]
pub struct UserAdminApiAdapter {
    client: Arc<ApiClient>,
}

impl UserAdminApiAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserAdminService for UserAdminApiAdapter {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.client.get(api::users::COLLECTION).await
    }

    async fn create_user(&self, req: CreateUserRequest) -> ClientResult<User> {
        self.client.post(api::users::COLLECTION, &req).await
    }

    async fn update_user_status(
        &self,
        user_id: UserId,
        req: UpdateUserStatusRequest,
    ) -> ClientResult<User> {
        let path = utils::replace_param(api::users::STATUS, "{id}", user_id.to_string());
        self.client.patch(&path, &req).await
    }
}
