//! Login, logout and self-registration.

use chrono::Utc;
use gasportal_auth::Session;
use gasportal_core::{Credentials, Role, RoleData, UserProfile};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::events::SessionEvent;
use crate::http::{ApiClient, ApiRequest, decode};

pub const LOGIN_PATH: &str = "/accounts/login/";
const REGISTER_STUDENT_PATH: &str = "/accounts/register/student/";

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserProfile,
    #[serde(default)]
    pub role_data: Option<RoleData>,
}

impl LoginResponse {
    /// Session role: the server's role descriptor, else the login page the
    /// credentials came from, else the user record, else student.
    pub fn resolve_role(&self, hint: Option<Role>) -> Role {
        self.role_data
            .map(|data| data.role)
            .or(hint)
            .or(self.user.role)
            .unwrap_or(Role::Student)
    }

    pub fn into_session(self, hint: Option<Role>) -> Session {
        let role = self.resolve_role(hint);
        Session::new(self.access, self.refresh, self.user, role)
    }
}

pub struct AccountsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Authenticate and persist the resulting session.
    ///
    /// Wrong credentials come back as [`ClientError::Api`] with the server's
    /// `detail`; they never trigger a token refresh.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        credentials.validate()?;

        let body = serde_json::to_value(credentials)
            .map_err(|e| ClientError::Decode(format!("failed to encode credentials: {e}")))?;
        let response = self
            .client
            .send_anonymous(&ApiRequest::post(LOGIN_PATH).json(body))
            .await
            .inspect_err(|e| {
                tracing::warn!(email = %credentials.email, error = %e, "login failed")
            })?;

        let login: LoginResponse = decode(response).await?;
        let session = login.into_session(credentials.role);
        let role = session.role();

        self.client.session().establish(session.clone()).await?;
        tracing::info!(user = %session.user().id, %role, "logged in");
        self.client.events().emit(SessionEvent::LoggedIn {
            role,
            at: Utc::now(),
        });

        Ok(session)
    }

    /// Drop the local session. Safe to call when already logged out.
    pub async fn logout(&self) -> ClientResult<()> {
        let role = self.client.session().role();
        self.client.session().clear().await?;
        tracing::info!(role = ?role, "logged out");
        self.client.events().emit(SessionEvent::LoggedOut {
            role,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Public student self-registration.
    pub async fn register_student(&self, registration: Value) -> ClientResult<Value> {
        let response = self
            .client
            .send_anonymous(&ApiRequest::post(REGISTER_STUDENT_PATH).json(registration))
            .await?;
        decode(response).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.client.session().access_token().await.is_some()
    }
}
