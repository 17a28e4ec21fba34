//! Login form payload.

use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, Role};

/// Email/password pair submitted from one of the role login pages.
///
/// `role` records which login page the credentials came from; the server may
/// use it as a hint and the client falls back to it when the login response
/// carries no role descriptor.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: None,
        }
    }

    pub fn for_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Presence and shape checks only; the server stays the authority.
    pub fn validate(&self) -> DomainResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(DomainError::validation("please fill in all fields"));
        }

        let email = self.email.trim();
        let well_formed = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !well_formed {
            return Err(DomainError::validation("email address is not valid"));
        }

        Ok(())
    }
}

// Keep passwords out of logs.
impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        assert!(Credentials::new("", "x").validate().is_err());
        assert!(Credentials::new("a@b.com", "").validate().is_err());
        assert!(Credentials::new("   ", "x").validate().is_err());
    }

    #[test]
    fn email_needs_local_and_domain_parts() {
        assert!(Credentials::new("a@b.com", "x").validate().is_ok());
        assert!(Credentials::new("invalid-email", "x").validate().is_err());
        assert!(Credentials::new("@b.com", "x").validate().is_err());
        assert!(Credentials::new("a@", "x").validate().is_err());
        assert!(Credentials::new("a@b@c", "x").validate().is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("a@b.com", "hunter2").for_role(Role::Student);
        let printed = format!("{creds:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("a@b.com"));
    }

    #[test]
    fn role_hint_is_optional_on_the_wire() {
        let json = serde_json::to_value(Credentials::new("a@b.com", "x")).unwrap();
        assert!(json.get("role").is_none());

        let json =
            serde_json::to_value(Credentials::new("a@b.com", "x").for_role(Role::Instructor))
                .unwrap();
        assert_eq!(json["role"], "instructor");
    }
}
