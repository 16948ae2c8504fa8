//! Route-level authorization
//!
//! [`AccessPolicy`] maps each protected `(method, route template)` pair to
//! the roles allowed to call it. Handlers carry no role annotations; the
//! auth middleware asks the policy once per request.

use super::error::AuthError;
use super::models::{AuthenticatedUser, Role};
use crate::routes::paths;
use axum::http::Method;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: HashMap<Method, HashMap<&'static str, HashSet<Role>>>,
}

impl AccessPolicy {
    /// A policy with no rules: every authenticated role passes everywhere
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `method` on `route` to `roles`; an empty slice means any
    /// authenticated role
    pub fn require(mut self, method: Method, route: &'static str, roles: &[Role]) -> Self {
        self.rules
            .entry(method)
            .or_default()
            .insert(route, roles.iter().copied().collect());
        self
    }

    /// Roles allowed on a route, or `None` if the route has no rule
    pub fn required_roles(&self, method: &Method, route: &str) -> Option<&HashSet<Role>> {
        self.rules.get(method)?.get(route)
    }

    /// The single authorization gate
    pub fn authorize(
        &self,
        method: &Method,
        route: &str,
        identity: &AuthenticatedUser,
    ) -> Result<(), AuthError> {
        match self.required_roles(method, route) {
            Some(roles) if !roles.is_empty() && !roles.contains(&identity.role) => {
                Err(AuthError::Forbidden)
            }
            _ => Ok(()),
        }
    }
}

/// The rule table served by the API
pub fn default_policy() -> AccessPolicy {
    let admin = &[Role::Admin];
    AccessPolicy::new()
        .require(Method::GET, paths::NATIONAL_PARKS, &[])
        .require(Method::GET, paths::NATIONAL_PARK, &[])
        .require(Method::POST, paths::NATIONAL_PARKS, admin)
        .require(Method::PATCH, paths::NATIONAL_PARK, admin)
        .require(Method::DELETE, paths::NATIONAL_PARK, admin)
        .require(Method::GET, paths::TRAILS, &[])
        .require(Method::GET, paths::TRAIL, admin)
        .require(Method::GET, paths::TRAILS_IN_PARK, &[])
        .require(Method::POST, paths::TRAILS, admin)
        .require(Method::PATCH, paths::TRAIL, admin)
        .require(Method::DELETE, paths::TRAIL, admin)
}
