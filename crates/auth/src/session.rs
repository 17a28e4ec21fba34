//! Session entity and its persisted store.

use std::sync::Arc;

use gasportal_core::{Role, RoleData, UserProfile};

use crate::storage::{KeyValueStore, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";
pub const ROLE_DATA_KEY: &str = "role_data";

/// Every key a session occupies, in write order.
pub const SESSION_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, ROLE_DATA_KEY];

/// Authenticated session: both tokens, the user profile and the role.
///
/// # Invariants
/// - Both tokens are present (a `Session` cannot be built without them).
/// - `user.role` always equals `role`.
#[derive(Clone, PartialEq)]
pub struct Session {
    access_token: String,
    refresh_token: String,
    user: UserProfile,
    role: Role,
}

impl Session {
    /// Build a session, stamping `role` onto the user record.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: UserProfile,
        role: Role,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user: user.with_role(role),
            role,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Same session with a freshly minted access token.
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = access_token.into();
        self
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("`{0}` is empty")]
    EmptyToken(&'static str),
    #[error("`{key}` is not valid JSON: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

/// Persisted session store.
///
/// The four session keys are only ever written or removed together, through
/// the backend's batch operations.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Persist all four pieces of `session` as one write.
    pub async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| StorageError::Backend(format!("failed to encode user: {e}")))?;
        let role_data = serde_json::to_string(&RoleData::from(session.role))
            .map_err(|e| StorageError::Backend(format!("failed to encode role_data: {e}")))?;

        self.backend
            .set_many(&[
                (ACCESS_TOKEN_KEY, session.access_token.clone()),
                (REFRESH_TOKEN_KEY, session.refresh_token.clone()),
                (USER_KEY, user),
                (ROLE_DATA_KEY, role_data),
            ])
            .await
    }

    /// Load the persisted session.
    ///
    /// Fails closed: a missing key, an empty token, unparseable JSON or a
    /// storage error all read as "no session".
    pub async fn load(&self) -> Option<Session> {
        match self.try_load().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable persisted session");
                None
            }
        }
    }

    /// Remove every session key. Safe to call on an empty store.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove_many(&SESSION_KEYS).await
    }

    /// Remove every session key, but only while the stored refresh token is
    /// still `refresh_token` (`None`: no session is stored).
    ///
    /// Returns `false`, leaving storage untouched, when another session has
    /// taken its place.
    pub async fn clear_if(&self, refresh_token: Option<&str>) -> Result<bool, StorageError> {
        self.backend
            .remove_many_if((REFRESH_TOKEN_KEY, refresh_token), &SESSION_KEYS)
            .await
    }

    /// Replace the access token of the session that owns `refresh_token`.
    ///
    /// Returns `false` without writing when the stored refresh token is
    /// missing or different, so a token minted for one session never lands
    /// in another and a lone access token is never persisted.
    pub async fn store_access_token(
        &self,
        refresh_token: &str,
        access_token: &str,
    ) -> Result<bool, StorageError> {
        if refresh_token.is_empty() {
            return Ok(false);
        }
        self.backend
            .set_many_if(
                (REFRESH_TOKEN_KEY, Some(refresh_token)),
                &[(ACCESS_TOKEN_KEY, access_token.to_string())],
            )
            .await
    }

    async fn try_load(&self) -> Result<Option<Session>, LoadError> {
        let values = self.backend.get_many(&SESSION_KEYS).await?;
        let [access, refresh, user, role_data]: [Option<String>; 4] = values
            .try_into()
            .map_err(|_| LoadError::Storage(StorageError::Backend("short read".into())))?;

        let (Some(access), Some(refresh), Some(user), Some(role_data)) =
            (access, refresh, user, role_data)
        else {
            return Ok(None);
        };

        if access.is_empty() {
            return Err(LoadError::EmptyToken(ACCESS_TOKEN_KEY));
        }
        if refresh.is_empty() {
            return Err(LoadError::EmptyToken(REFRESH_TOKEN_KEY));
        }

        let user: UserProfile = serde_json::from_str(&user).map_err(|e| LoadError::Corrupt {
            key: USER_KEY,
            reason: e.to_string(),
        })?;
        let role_data: RoleData =
            serde_json::from_str(&role_data).map_err(|e| LoadError::Corrupt {
                key: ROLE_DATA_KEY,
                reason: e.to_string(),
            })?;

        // role_data is authoritative over whatever role the user record carries.
        Ok(Some(Session::new(access, refresh, user, role_data.role)))
    }
}
