//! HTTP client with the bearer-token interceptor.
//!
//! Every authenticated request follows the same small state machine:
//!
//! 1. Issue with `Authorization: Bearer <access>` when a session exists.
//! 2. Any status other than 401 is final (2xx passes through, the rest
//!    becomes [`ClientError::Api`]).
//! 3. On the first 401, refresh the access token once and re-issue the same
//!    request with the new token.
//! 4. A failed refresh, or a second 401, clears the session, emits
//!    [`SessionEvent::Invalidated`] and fails with
//!    [`ClientError::SessionExpired`].
//!
//! Writes in steps 3 and 4 only apply to the session the request was sent
//! for. If a logout or another sign-in replaced it meanwhile, the new token
//! is dropped, nothing is cleared and the call fails with
//! [`ClientError::SessionReplaced`].
//!
//! Concurrent requests that expire together each run their own refresh.

use std::sync::Arc;

use chrono::Utc;
use gasportal_auth::SessionManager;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::{InvalidationReason, SessionEvent, SessionEvents};

/// Token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/token/refresh/";

/// A request that can be issued more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// API client shared by every service binding.
///
/// Cheap to clone; clones share the connection pool, the session manager and
/// the event hub.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: SessionManager,
    events: SessionEvents,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionManager) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            session,
            events: SessionEvents::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Send through the interceptor and decode the JSON body.
    ///
    /// An empty body decodes as JSON `null`.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.send(&request).await?;
        decode(response).await
    }

    /// Send through the interceptor, discarding the body.
    pub async fn execute(&self, request: ApiRequest) -> ClientResult<()> {
        self.send(&request).await.map(|_| ())
    }

    /// Send through the interceptor.
    pub async fn send(&self, request: &ApiRequest) -> ClientResult<Response> {
        // The refresh token identifies the session this request acts for.
        let session = self.session.current().await;
        let owner = session.as_ref().map(|s| s.refresh_token().to_string());
        let mut token = session.map(|s| s.access_token().to_string());
        let mut retried = false;

        loop {
            let response = self.issue(request, token.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return check_status(response).await;
            }

            if retried {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    "still unauthorized after refresh"
                );
                return Err(self
                    .invalidate(owner.as_deref(), InvalidationReason::RetryUnauthorized)
                    .await);
            }
            retried = true;

            match self.refresh(owner.as_deref()).await {
                Ok(access) => token = Some(access),
                Err(RefreshFailure::Superseded) => return Err(ClientError::SessionReplaced),
                Err(RefreshFailure::Invalid(reason)) => {
                    return Err(self.invalidate(owner.as_deref(), reason).await);
                }
            }
        }
    }

    /// Send without credentials and without refresh handling.
    ///
    /// Used for login and self-registration, where a 401 means "wrong
    /// credentials" rather than "expired session".
    pub async fn send_anonymous(&self, request: &ApiRequest) -> ClientResult<Response> {
        let response = self.issue(request, None).await?;
        check_status(response).await
    }

    async fn issue(&self, request: &ApiRequest, token: Option<&str>) -> ClientResult<Response> {
        let url = self.config.endpoint(&request.path);
        tracing::debug!(
            method = %request.method,
            %url,
            authenticated = token.is_some(),
            "issuing request"
        );

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    /// Mint a new access token for the session owning `refresh`.
    async fn refresh(&self, refresh: Option<&str>) -> Result<String, RefreshFailure> {
        let Some(refresh) = refresh else {
            tracing::warn!("unauthorized with no refresh token on hand");
            return Err(InvalidationReason::NoRefreshToken.into());
        };

        let url = self.config.endpoint(REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "token refresh got no response");
                InvalidationReason::RefreshFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token refresh rejected");
            return Err(InvalidationReason::RefreshRejected {
                status: status.as_u16(),
            }
            .into());
        }

        let RefreshResponse { access } = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "token refresh returned an unreadable body");
            InvalidationReason::RefreshFailed
        })?;

        match self.session.replace_access_token(refresh, &access).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("session ended or was replaced mid-refresh; dropping new token");
                return Err(RefreshFailure::Superseded);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to persist refreshed access token");
                return Err(InvalidationReason::RefreshFailed.into());
            }
        }

        tracing::info!("access token refreshed");
        self.events.emit(SessionEvent::Refreshed { at: Utc::now() });
        Ok(access)
    }

    /// Terminal auth failure: drop the session owning `refresh` and tell the
    /// listener. A session that has since replaced it is left alone.
    async fn invalidate(&self, refresh: Option<&str>, reason: InvalidationReason) -> ClientError {
        let role = self.session.role();
        match self.session.clear_if(refresh).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(%reason, "session replaced while the request was in flight");
                return ClientError::SessionReplaced;
            }
            Err(e) => tracing::error!(error = %e, "failed to clear persisted session"),
        }
        tracing::warn!(%reason, "session invalidated");
        self.events.emit(SessionEvent::Invalidated {
            role,
            reason,
            at: Utc::now(),
        });
        ClientError::SessionExpired
    }
}

enum RefreshFailure {
    /// The session ends; see the reason.
    Invalid(InvalidationReason),
    /// The session that asked for the refresh is gone and another may be
    /// signed in; nothing to clear.
    Superseded,
}

impl From<InvalidationReason> for RefreshFailure {
    fn from(reason: InvalidationReason) -> Self {
        RefreshFailure::Invalid(reason)
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let raw = response.text().await.unwrap_or_default();
    Err(ClientError::from_response(status.as_u16(), &raw))
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builder_keeps_everything_for_a_retry() {
        let request = ApiRequest::patch("/assignments/submissions/9/")
            .json(json!({ "score": 90 }))
            .query("page", 2);

        let again = request.clone();
        assert_eq!(again, request);
        assert_eq!(again.method(), &Method::PATCH);
        assert_eq!(again.path(), "/assignments/submissions/9/");
        assert_eq!(again.body(), Some(&json!({ "score": 90 })));
        assert_eq!(again.query, vec![("page".to_string(), "2".to_string())]);
    }
}
