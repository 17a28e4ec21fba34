//! `gasportal-core`: shared vocabulary of the school portal client.
//!
//! Pure types only: roles, user profiles and login credentials. Nothing in
//! this crate performs I/O.

pub mod credentials;
pub mod error;
pub mod role;
pub mod user;

pub use credentials::Credentials;
pub use error::{DomainError, DomainResult};
pub use role::{Role, RoleData};
pub use user::{UserId, UserProfile};
