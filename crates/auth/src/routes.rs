//! Declared metadata for protected portal sections.

use std::borrow::Cow;

use gasportal_core::Role;

/// Login page used when a protected route declares no role.
pub const DEFAULT_LOGIN_PATH: &str = "/login/student";

/// A protected section of the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    prefix: Cow<'static, str>,
    required_role: Option<Role>,
}

impl ProtectedRoute {
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
            required_role: None,
        }
    }

    pub fn for_role(prefix: impl Into<Cow<'static, str>>, role: Role) -> Self {
        Self {
            prefix: prefix.into(),
            required_role: Some(role),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    /// Where an anonymous visitor of this section is sent.
    pub fn login_path(&self) -> &'static str {
        self.required_role
            .map(|role| role.login_path())
            .unwrap_or(DEFAULT_LOGIN_PATH)
    }

    /// Segment-aware prefix match: `/dashboard/student` covers
    /// `/dashboard/student/grades` but not `/dashboard/students`.
    pub fn covers(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Table of protected sections.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ProtectedRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The portal's student and instructor areas.
    pub fn portal() -> Self {
        Self::new()
            .with(ProtectedRoute::for_role("/dashboard/student", Role::Student))
            .with(ProtectedRoute::for_role("/dashboard/instructor", Role::Instructor))
    }

    pub fn with(mut self, route: ProtectedRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// Most specific protected section covering `path`, if any.
    pub fn find(&self, path: &str) -> Option<&ProtectedRoute> {
        self.routes
            .iter()
            .filter(|route| route.covers(path))
            .max_by_key(|route| route.prefix().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching_respects_segments() {
        let route = ProtectedRoute::for_role("/dashboard/student", Role::Student);
        assert!(route.covers("/dashboard/student"));
        assert!(route.covers("/dashboard/student/"));
        assert!(route.covers("/dashboard/student/courses/4?tab=grades"));
        assert!(!route.covers("/dashboard/students"));
        assert!(!route.covers("/login/student"));
    }

    #[test]
    fn login_destination_comes_from_metadata() {
        let table = RouteTable::portal();
        let instructor = table.find("/dashboard/instructor/modules/3").unwrap();
        assert_eq!(instructor.login_path(), "/login/instructor");

        let student = table.find("/dashboard/student/ewallet").unwrap();
        assert_eq!(student.login_path(), "/login/student");

        assert!(table.find("/select-role").is_none());
    }

    #[test]
    fn undeclared_role_falls_back_to_default_login() {
        let route = ProtectedRoute::new("/reports");
        assert_eq!(route.login_path(), DEFAULT_LOGIN_PATH);
    }

    #[test]
    fn most_specific_route_wins() {
        let table = RouteTable::new()
            .with(ProtectedRoute::new("/dashboard"))
            .with(ProtectedRoute::for_role("/dashboard/funder", Role::Funder));

        let route = table.find("/dashboard/funder/grants").unwrap();
        assert_eq!(route.required_role(), Some(Role::Funder));
        assert_eq!(table.find("/dashboard/other").unwrap().required_role(), None);
    }
}
