use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Portal role of an authenticated user.
///
/// The role picks the login page a guarded route or an ended session sends
/// the visitor to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Funder,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Instructor, Role::Funder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Funder => "funder",
        }
    }

    /// Login page for this role.
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Student => "/login/student",
            Role::Instructor => "/login/instructor",
            Role::Funder => "/login/funder",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "funder" => Ok(Role::Funder),
            other => Err(DomainError::invalid_role(other)),
        }
    }
}

/// Role descriptor as returned by the login endpoint and persisted under
/// the `role_data` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleData {
    pub role: Role,
}

impl From<Role> for RoleData {
    fn from(role: Role) -> Self {
        Self { role }
    }
}
