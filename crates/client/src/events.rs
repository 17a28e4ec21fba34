//! Typed session lifecycle events.
//!
//! The HTTP layer never navigates. It publishes these events and a single
//! top-level listener (see [`crate::navigation`]) turns them into navigation.

use chrono::{DateTime, Utc};
use gasportal_auth::DEFAULT_LOGIN_PATH;
use gasportal_core::Role;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

/// Why a session was dropped by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// An authorization failure occurred with no refresh token on hand.
    NoRefreshToken,
    /// The refresh endpoint answered with a non-success status.
    RefreshRejected { status: u16 },
    /// The refresh call got no usable answer (transport or body error).
    RefreshFailed,
    /// The request was still unauthorized after a successful refresh.
    RetryUnauthorized,
}

impl core::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvalidationReason::NoRefreshToken => f.write_str("no refresh token"),
            InvalidationReason::RefreshRejected { status } => {
                write!(f, "refresh rejected with status {status}")
            }
            InvalidationReason::RefreshFailed => f.write_str("refresh failed"),
            InvalidationReason::RetryUnauthorized => {
                f.write_str("request still unauthorized after refresh")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn {
        role: Role,
        at: DateTime<Utc>,
    },
    Refreshed {
        at: DateTime<Utc>,
    },
    LoggedOut {
        role: Option<Role>,
        at: DateTime<Utc>,
    },
    Invalidated {
        role: Option<Role>,
        reason: InvalidationReason,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Login page to land on after this event, if it ends the session.
    pub fn login_redirect(&self) -> Option<&'static str> {
        match self {
            SessionEvent::LoggedOut { role, .. } | SessionEvent::Invalidated { role, .. } => {
                Some(role.map(|r| r.login_path()).unwrap_or(DEFAULT_LOGIN_PATH))
            }
            SessionEvent::LoggedIn { .. } | SessionEvent::Refreshed { .. } => None,
        }
    }
}

/// Broadcast hub for [`SessionEvent`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no listeners is not an error.
    pub fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("session event dropped: no listeners");
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
