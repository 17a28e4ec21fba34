//! Route guard: gate protected sections on session presence.
//!
//! The guard checks *presence* only. A signed-in student reaching an
//! instructor section is let through (with a warning); the API is expected to
//! enforce per-role authorization.

use tokio::sync::watch;

use crate::manager::{AuthState, SessionManager};
use crate::routes::{ProtectedRoute, RouteTable};

/// What the caller should show for a guarded path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session hydration is still in flight: show a neutral loading state.
    Loading,
    /// No session: replace the current location with `to`, remembering `from`
    /// so login can return there.
    Redirect { to: &'static str, from: String },
    /// Render the protected content.
    Render,
}

/// Route guard bound to a session manager's published state.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    state: watch::Receiver<AuthState>,
}

impl RouteGuard {
    pub fn new(state: watch::Receiver<AuthState>) -> Self {
        Self { state }
    }

    pub fn for_manager(manager: &SessionManager) -> Self {
        Self::new(manager.subscribe())
    }

    /// Decide immediately from the current state.
    pub fn check(&self, route: &ProtectedRoute, requested_path: &str) -> GuardOutcome {
        decide(&self.state.borrow(), route, requested_path)
    }

    /// Decide for any path: paths outside `table` are public.
    pub fn check_path(&self, table: &RouteTable, requested_path: &str) -> GuardOutcome {
        match table.find(requested_path) {
            Some(route) => self.check(route, requested_path),
            None => GuardOutcome::Render,
        }
    }

    /// Wait for hydration to finish, then decide.
    ///
    /// If the session manager goes away before hydrating, the visitor is
    /// treated as anonymous.
    pub async fn resolve(&mut self, route: &ProtectedRoute, requested_path: &str) -> GuardOutcome {
        match self.state.wait_for(|state| !state.is_hydrating()).await {
            Ok(state) => decide(&state, route, requested_path),
            Err(_) => decide(&AuthState::Anonymous, route, requested_path),
        }
    }
}

fn decide(state: &AuthState, route: &ProtectedRoute, requested_path: &str) -> GuardOutcome {
    match state {
        AuthState::Hydrating => GuardOutcome::Loading,
        AuthState::Anonymous => {
            tracing::debug!(path = requested_path, to = route.login_path(), "redirecting to login");
            GuardOutcome::Redirect {
                to: route.login_path(),
                from: requested_path.to_string(),
            }
        }
        AuthState::Authenticated(session) => {
            if let Some(required) = route.required_role() {
                if required != session.role() {
                    tracing::warn!(
                        path = requested_path,
                        required = %required,
                        actual = %session.role(),
                        "session role does not match section; allowing (presence-only guard)"
                    );
                }
            }
            GuardOutcome::Render
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use gasportal_core::{Role, UserProfile};
    use tokio::sync::Semaphore;

    use super::*;
    use crate::session::Session;
    use crate::storage::{KeyValueStore, MemoryStore, StorageError};

    /// Storage whose reads block until the test releases them.
    struct GatedStore {
        inner: MemoryStore,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl KeyValueStore for GatedStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            self.inner.get(key).await
        }

        async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            self.inner.get_many(keys).await
        }

        async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
            self.inner.set_many(entries).await
        }

        async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
            self.inner.remove_many(keys).await
        }

        async fn set_many_if(
            &self,
            expected: (&str, Option<&str>),
            entries: &[(&str, String)],
        ) -> Result<bool, StorageError> {
            self.inner.set_many_if(expected, entries).await
        }

        async fn remove_many_if(
            &self,
            expected: (&str, Option<&str>),
            keys: &[&str],
        ) -> Result<bool, StorageError> {
            self.inner.remove_many_if(expected, keys).await
        }
    }

    fn session(role: Role) -> Session {
        Session::new("t1", "r1", UserProfile::new(1), role)
    }

    fn instructor_area() -> ProtectedRoute {
        ProtectedRoute::for_role("/dashboard/instructor", Role::Instructor)
    }

    #[tokio::test]
    async fn loading_for_the_whole_hydration_window() {
        let inner = MemoryStore::new();
        SessionManager::with_backend(Arc::new(inner.clone()))
            .establish(session(Role::Instructor))
            .await
            .unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let manager = SessionManager::with_backend(Arc::new(GatedStore {
            inner,
            gate: gate.clone(),
        }));
        let guard = RouteGuard::for_manager(&manager);
        let route = instructor_area();

        let hydrating = tokio::spawn({
            let manager = manager.clone();
            async move { manager.init().await }
        });

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(
                guard.check(&route, "/dashboard/instructor/modules"),
                GuardOutcome::Loading
            );
        }

        gate.add_permits(16);
        assert!(hydrating.await.unwrap().is_some());

        assert_eq!(
            guard.check(&route, "/dashboard/instructor/modules"),
            GuardOutcome::Render
        );
    }

    #[tokio::test]
    async fn resolve_waits_for_hydration() {
        let manager = SessionManager::with_backend(Arc::new(MemoryStore::new()));
        let mut guard = RouteGuard::for_manager(&manager);
        let route = instructor_area();

        let pending = tokio::spawn(async move {
            guard
                .resolve(&route, "/dashboard/instructor/students")
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!pending.is_finished());

        manager.init().await;
        assert_eq!(
            pending.await.unwrap(),
            GuardOutcome::Redirect {
                to: "/login/instructor",
                from: "/dashboard/instructor/students".into(),
            }
        );
    }

    #[tokio::test]
    async fn anonymous_visitor_goes_to_the_sections_login() {
        let manager = SessionManager::with_backend(Arc::new(MemoryStore::new()));
        manager.init().await;
        let guard = RouteGuard::for_manager(&manager);

        let outcome = guard.check_path(&RouteTable::portal(), "/dashboard/student/grades");
        assert_eq!(
            outcome,
            GuardOutcome::Redirect {
                to: "/login/student",
                from: "/dashboard/student/grades".into(),
            }
        );

        assert_eq!(
            guard.check_path(&RouteTable::portal(), "/login/student"),
            GuardOutcome::Render
        );
    }

    #[tokio::test]
    async fn role_mismatch_is_not_rejected() {
        let manager = SessionManager::with_backend(Arc::new(MemoryStore::new()));
        manager.establish(session(Role::Student)).await.unwrap();
        let guard = RouteGuard::for_manager(&manager);

        assert_eq!(
            guard.check(&instructor_area(), "/dashboard/instructor"),
            GuardOutcome::Render
        );
    }

    #[tokio::test]
    async fn logout_flips_the_guard_back_to_redirect() {
        let manager = SessionManager::with_backend(Arc::new(MemoryStore::new()));
        manager.establish(session(Role::Instructor)).await.unwrap();
        let guard = RouteGuard::for_manager(&manager);
        assert_eq!(guard.check(&instructor_area(), "/dashboard/instructor"), GuardOutcome::Render);

        manager.clear().await.unwrap();
        assert!(matches!(
            guard.check(&instructor_area(), "/dashboard/instructor"),
            GuardOutcome::Redirect { .. }
        ));
    }

    #[tokio::test]
    async fn dropped_manager_resolves_as_anonymous() {
        let manager = SessionManager::with_backend(Arc::new(MemoryStore::new()));
        let mut guard = RouteGuard::for_manager(&manager);
        drop(manager);

        assert!(matches!(
            guard.resolve(&instructor_area(), "/dashboard/instructor").await,
            GuardOutcome::Redirect { .. }
        ));
    }
}
