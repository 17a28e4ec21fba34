//! `gasportal-auth`: client-side session lifecycle and route guarding.
//!
//! No HTTP in here. Persistence goes through the [`KeyValueStore`] seam;
//! transport lives in `gasportal-client`.

pub mod guard;
pub mod manager;
pub mod routes;
pub mod session;
pub mod storage;

pub use guard::{GuardOutcome, RouteGuard};
pub use manager::{AuthState, SessionManager};
pub use routes::{DEFAULT_LOGIN_PATH, ProtectedRoute, RouteTable};
pub use session::{SESSION_KEYS, Session, SessionStore};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
