//! Session lifecycle owner shared by the HTTP client and the route guard.

use std::sync::Arc;

use gasportal_core::Role;
use tokio::sync::watch;

use crate::session::{Session, SessionStore};
use crate::storage::{KeyValueStore, StorageError};

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Initial load from storage has not finished.
    Hydrating,
    /// Hydrated, nobody signed in.
    Anonymous,
    /// Hydrated, signed in.
    Authenticated(Session),
}

impl AuthState {
    pub fn is_hydrating(&self) -> bool {
        matches!(self, AuthState::Hydrating)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Owner of the session lifecycle.
///
/// Cheap to clone; all clones share the store and the published state.
/// Writes go to storage first and are published only once persisted.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    state: Arc<watch::Sender<AuthState>>,
}

impl SessionManager {
    pub fn new(store: SessionStore) -> Self {
        let (state, _) = watch::channel(AuthState::Hydrating);
        Self {
            store,
            state: Arc::new(state),
        }
    }

    pub fn with_backend(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::new(SessionStore::new(backend))
    }

    /// Hydrate from storage. Until this resolves the state is `Hydrating`.
    pub async fn init(&self) -> Option<Session> {
        let loaded = self.store.load().await;
        match &loaded {
            Some(session) => {
                tracing::info!(
                    user = %session.user().id,
                    role = %session.role(),
                    "restored session"
                );
                self.state
                    .send_replace(AuthState::Authenticated(session.clone()));
            }
            None => {
                tracing::debug!("no persisted session");
                self.state.send_replace(AuthState::Anonymous);
            }
        }
        loaded
    }

    /// Persist and publish a freshly established session.
    pub async fn establish(&self, session: Session) -> Result<(), StorageError> {
        self.store.save(&session).await?;
        tracing::info!(user = %session.user().id, role = %session.role(), "session established");
        self.state.send_replace(AuthState::Authenticated(session));
        Ok(())
    }

    /// Swap in an access token refreshed with `refresh_token`.
    ///
    /// Returns `false` when the session owning `refresh_token` is gone
    /// (logged out, or replaced by another sign-in).
    pub async fn replace_access_token(
        &self,
        refresh_token: &str,
        access_token: &str,
    ) -> Result<bool, StorageError> {
        if !self
            .store
            .store_access_token(refresh_token, access_token)
            .await?
        {
            return Ok(false);
        }

        self.state.send_if_modified(|state| match state {
            AuthState::Authenticated(session) if session.refresh_token() == refresh_token => {
                *session = session.clone().with_access_token(access_token);
                true
            }
            _ => false,
        });
        Ok(true)
    }

    /// Remove the session from storage and publish `Anonymous`. Idempotent.
    ///
    /// The published state flips even if storage removal fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let result = self.store.clear().await;
        self.publish_anonymous();
        result
    }

    fn publish_anonymous(&self) {
        self.state.send_if_modified(|state| {
            if matches!(state, AuthState::Anonymous) {
                false
            } else {
                *state = AuthState::Anonymous;
                true
            }
        });
    }

    /// Drop the session owning `refresh_token` (`None`: only while no session
    /// is stored) and publish `Anonymous`.
    ///
    /// Returns `false` and leaves everything in place when a different
    /// session is stored. On a storage error the published state still flips.
    pub async fn clear_if(&self, refresh_token: Option<&str>) -> Result<bool, StorageError> {
        let cleared = self.store.clear_if(refresh_token).await;
        if matches!(cleared, Ok(false)) {
            return Ok(false);
        }
        self.publish_anonymous();
        cleared
    }

    /// Current session, read through from storage.
    ///
    /// Changes made by another handle over the same backend are visible here.
    pub async fn current(&self) -> Option<Session> {
        self.store.load().await
    }

    pub async fn access_token(&self) -> Option<String> {
        self.current().await.map(|s| s.access_token().to_string())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.current().await.map(|s| s.refresh_token().to_string())
    }

    /// Role of the last published session, without touching storage.
    pub fn role(&self) -> Option<Role> {
        self.state.borrow().session().map(Session::role)
    }

    /// Snapshot of the published state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use gasportal_core::UserProfile;

    fn manager() -> (MemoryStore, SessionManager) {
        let backend = MemoryStore::new();
        let manager = SessionManager::with_backend(Arc::new(backend.clone()));
        (backend, manager)
    }

    fn session() -> Session {
        Session::new("t1", "r1", UserProfile::new(1), Role::Instructor)
    }

    #[tokio::test]
    async fn starts_hydrating_until_init() {
        let (_, manager) = manager();
        assert!(manager.state().is_hydrating());

        assert!(manager.init().await.is_none());
        assert_eq!(manager.state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn init_restores_a_persisted_session() {
        let (backend, first) = manager();
        first.establish(session()).await.unwrap();

        let second = SessionManager::with_backend(Arc::new(backend));
        let restored = second.init().await.unwrap();
        assert_eq!(restored.access_token(), "t1");
        assert_eq!(second.role(), Some(Role::Instructor));
    }

    #[tokio::test]
    async fn refresh_updates_storage_and_published_state() {
        let (_, manager) = manager();
        manager.establish(session()).await.unwrap();

        assert!(manager.replace_access_token("r1", "t2").await.unwrap());
        assert_eq!(manager.access_token().await.as_deref(), Some("t2"));
        assert_eq!(manager.refresh_token().await.as_deref(), Some("r1"));
        assert_eq!(manager.state().session().unwrap().access_token(), "t2");
    }

    #[tokio::test]
    async fn refresh_without_session_is_a_no_op() {
        let (backend, manager) = manager();
        manager.init().await;

        assert!(!manager.replace_access_token("r1", "t2").await.unwrap());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn late_refresh_and_late_failure_leave_the_next_user_alone() {
        let (_, manager) = manager();
        manager.establish(session()).await.unwrap();
        let first_refresh = manager.refresh_token().await.unwrap();

        manager.clear().await.unwrap();
        let next = Session::new("tY", "rY", UserProfile::new(2), Role::Student);
        manager.establish(next.clone()).await.unwrap();

        assert!(!manager.replace_access_token(&first_refresh, "t1-fresh").await.unwrap());
        assert!(!manager.clear_if(Some(&first_refresh)).await.unwrap());

        assert_eq!(manager.current().await, Some(next.clone()));
        assert_eq!(manager.state(), AuthState::Authenticated(next));
    }

    #[tokio::test]
    async fn conditional_clear_of_the_owner_publishes_anonymous() {
        let (backend, manager) = manager();
        manager.establish(session()).await.unwrap();

        assert!(manager.clear_if(Some("r1")).await.unwrap());
        assert_eq!(manager.state(), AuthState::Anonymous);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn clear_publishes_anonymous_once() {
        let (_, manager) = manager();
        manager.establish(session()).await.unwrap();
        let mut rx = manager.subscribe();
        rx.borrow_and_update();

        manager.clear().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AuthState::Anonymous);

        manager.clear().await.unwrap();
        assert!(!rx.has_changed().unwrap());
        assert!(manager.current().await.is_none());
    }
}
