use std::fmt::Debug;
use std::sync::Arc;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::domains::auth::errors::{
    AuthError, ClientResult, NetworkError, ServerError,
};
use crate::infra::config::{Config, normalize_base_url};
use crate::infra::storage::TokenStore;

/// Callback run when the API rejects the ambient session with a 401
pub trait SessionInvalidation: Send + Sync + Debug {
    fn invalidate(&self);
}

/// Which bearer a request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bearer<'a> {
    /// Whatever token is persisted at send time
    Ambient,
    /// A caller-supplied token; its 401s do not touch the ambient session
    Explicit(&'a str),
}

/// API client that decorates every call with the persisted bearer token and
/// reports 401 responses to the injected [`SessionInvalidation`].
///
/// No retries, no backoff: errors other than 401 pass through unchanged.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    invalidation: Arc<dyn SessionInvalidation>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field(
                "has_token",
                &self.tokens.load().map(|t| t.is_some()).unwrap_or(false),
            )
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        config: &Config,
        tokens: Arc<dyn TokenStore>,
        invalidation: Arc<dyn SessionInvalidation>,
    ) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.api_base_url);
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        log::info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            tokens,
            invalidation,
        })
    }

    /// Join a route onto the base URL
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach `Authorization: Bearer <token>` when a token is available
    fn authorize(&self, builder: RequestBuilder, bearer: Bearer<'_>) -> RequestBuilder {
        let token = match bearer {
            Bearer::Explicit(token) => Some(token.to_string()),
            Bearer::Ambient => match self.tokens.load() {
                Ok(token) => token,
                Err(e) => {
                    warn!("[ApiClient] Token slot unreadable, sending anonymously: {}", e);
                    None
                }
            },
        };
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and map every non-2xx status to an error
    async fn send(
        &self,
        builder: RequestBuilder,
        bearer: Bearer<'_>,
    ) -> ClientResult<Response> {
        let response = self.authorize(builder, bearer).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            debug!("[ApiClient] 401 from {}", response.url().path());
            if bearer == Bearer::Ambient {
                self.invalidation.invalidate();
            }
            return Err(AuthError::SessionExpired.into());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ServerError {
            status: status.as_u16(),
            message: extract_message(&body),
        }
        .into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()).into())
    }

    /// GET request with authentication
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        let url = self.build_url(path);
        debug!("[ApiClient] GET {}", url);
        let response = self.send(self.client.get(&url), Bearer::Ambient).await?;
        Self::decode(response).await
    }

    /// POST request with authentication
    pub async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<R> {
        let url = self.build_url(path);
        debug!("[ApiClient] POST {}", url);
        let response = self
            .send(self.client.post(&url).json(body), Bearer::Ambient)
            .await?;
        Self::decode(response).await
    }

    /// PATCH request with authentication
    pub async fn patch<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<R> {
        let url = self.build_url(path);
        debug!("[ApiClient] PATCH {}", url);
        let response = self
            .send(self.client.patch(&url).json(body), Bearer::Ambient)
            .await?;
        Self::decode(response).await
    }

    /// POST without a body, authenticated with an explicit token, ignoring
    /// whatever the response carries
    pub async fn post_empty_with_token(&self, path: &str, token: &str) -> ClientResult<()> {
        let url = self.build_url(path);
        debug!("[ApiClient] POST {}", url);
        self.send(self.client.post(&url), Bearer::Explicit(token))
            .await
            .map(drop)
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API answers with plain text; JSON bodies carrying `message` or
/// `error` are unwrapped as well.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(text)) => Some(text),
        Ok(serde_json::Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        _ => Some(body.to_string()),
    }
}
