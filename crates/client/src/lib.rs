//! `gasportal-client`: HTTP access to the portal API.
//!
//! [`ApiClient`] attaches the session's bearer token to every call and
//! recovers once from an expired access token. When recovery fails the
//! session is cleared and a [`SessionEvent::Invalidated`] is published; the
//! application wires a [`Navigator`] to those events with
//! [`spawn_session_listener`].

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod navigation;
pub mod persist;
pub mod services;

use std::sync::Arc;

use gasportal_auth::SessionManager;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use events::{InvalidationReason, SessionEvent, SessionEvents};
pub use http::{ApiClient, ApiRequest};
pub use navigation::{Navigator, run_session_listener, spawn_session_listener};
pub use persist::SqliteStore;

/// Build a client backed by the on-disk session store and hydrate it.
///
/// Configuration comes from the environment (see [`ClientConfig::from_env`]).
pub async fn connect_default() -> anyhow::Result<ApiClient> {
    let config = ClientConfig::from_env()?;
    let store = SqliteStore::open_default()?;
    let session = SessionManager::with_backend(Arc::new(store));
    session.init().await;
    Ok(ApiClient::new(config, session)?)
}
