//! Top-level listener turning session events into navigation.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::events::SessionEvent;

/// Whatever owns the current location (a window, a router, a TUI screen stack).
pub trait Navigator: Send + Sync {
    /// Replace the current location with `to`.
    fn navigate(&self, to: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, to: &str) {
        self(to)
    }
}

/// Drive `navigator` from session events until the event hub goes away.
///
/// Logouts and invalidated sessions land on the login page of the role that
/// was signed in.
pub async fn run_session_listener<N: Navigator>(
    mut events: broadcast::Receiver<SessionEvent>,
    navigator: N,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(to) = event.login_redirect() {
                    tracing::info!(to, ?event, "session ended; navigating to login");
                    navigator.navigate(to);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session listener lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Spawn [`run_session_listener`] on the current tokio runtime.
pub fn spawn_session_listener<N>(
    events: broadcast::Receiver<SessionEvent>,
    navigator: N,
) -> JoinHandle<()>
where
    N: Navigator + 'static,
{
    tokio::spawn(run_session_listener(events, navigator))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use gasportal_core::Role;

    use super::*;
    use crate::events::{InvalidationReason, SessionEvents};

    #[tokio::test]
    async fn navigates_on_terminal_events_only() {
        let events = SessionEvents::new();
        let visited = Arc::new(Mutex::new(Vec::<String>::new()));

        let handle = spawn_session_listener(events.subscribe(), {
            let visited = visited.clone();
            move |to: &str| visited.lock().unwrap().push(to.to_string())
        });

        events.emit(SessionEvent::LoggedIn {
            role: Role::Instructor,
            at: Utc::now(),
        });
        events.emit(SessionEvent::Invalidated {
            role: Some(Role::Instructor),
            reason: InvalidationReason::RefreshRejected { status: 401 },
            at: Utc::now(),
        });
        events.emit(SessionEvent::LoggedOut {
            role: Some(Role::Student),
            at: Utc::now(),
        });

        drop(events);
        handle.await.unwrap();

        assert_eq!(
            *visited.lock().unwrap(),
            vec!["/login/instructor".to_string(), "/login/student".to_string()]
        );
    }
}
