//! User profile as delivered by the accounts API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Role;

/// Server-assigned user identifier.
///
/// The accounts API hands out integer keys, but string keys are accepted so
/// the profile stays opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserId::Int(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Profile record of the signed-in user.
///
/// Only `id` and `role` carry meaning for the session core; every other field
/// the server sends is preserved in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "firstName")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "lastName")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            email: None,
            role: None,
            extra: Map::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// "First Last", falling back to the email address, then the id.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();

        if !parts.is_empty() {
            return parts.join(" ");
        }
        match &self.email {
            Some(email) => email.clone(),
            None => self.id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "id": 7,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "ewallet": { "id": 3, "balance": "12.50" }
        });

        let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(profile.id, UserId::Int(7));
        assert_eq!(profile.role, None);
        assert_eq!(profile.extra["ewallet"]["id"], 3);

        assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
    }

    #[test]
    fn accepts_camel_case_names_and_string_ids() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "u-1",
            "firstName": "Grace",
            "role": "funder"
        }))
        .unwrap();

        assert_eq!(profile.id, UserId::Text("u-1".into()));
        assert_eq!(profile.first_name.as_deref(), Some("Grace"));
        assert_eq!(profile.role, Some(Role::Funder));
    }

    #[test]
    fn display_name_falls_back() {
        let mut profile = UserProfile::new(1);
        assert_eq!(profile.display_name(), "1");

        profile.email = Some("a@b.com".into());
        assert_eq!(profile.display_name(), "a@b.com");

        profile.first_name = Some("Ada".into());
        assert_eq!(profile.display_name(), "Ada");
    }
}
