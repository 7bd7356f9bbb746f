//! Caller identity.
//!
//! Requests carry no credentials; the caller names a user id in the body or
//! query string and anything missing falls back to a shared guest id. The
//! resolver sits behind a trait so an authenticated source can replace it
//! without touching the handlers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_USER_ID;

/// Opaque user identifier used to key carts and favorites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns the user id claimed by a request into the id the services act on.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, claimed: Option<&str>) -> UserId;
}

/// Trusts whatever id the caller supplies; blank or missing ids map to the
/// configured default user.
#[derive(Debug, Clone)]
pub struct GuestIdentity {
    default_user: String,
}

impl GuestIdentity {
    pub fn new(default_user: impl Into<String>) -> Self {
        let default_user = default_user.into();
        let default_user = match default_user.trim() {
            "" => DEFAULT_USER_ID.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self { default_user }
    }
}

impl Default for GuestIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID)
    }
}

impl IdentityResolver for GuestIdentity {
    fn resolve(&self, claimed: Option<&str>) -> UserId {
        match claimed.map(str::trim) {
            Some(id) if !id.is_empty() => UserId::new(id),
            _ => UserId::new(self.default_user.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_resolves_to_guest() {
        let resolver = GuestIdentity::default();
        assert_eq!(resolver.resolve(None).as_str(), "guest");
        assert_eq!(resolver.resolve(Some("   ")).as_str(), "guest");
    }

    #[test]
    fn claimed_id_is_trimmed() {
        let resolver = GuestIdentity::default();
        assert_eq!(resolver.resolve(Some(" alice ")).as_str(), "alice");
    }

    #[test]
    fn configured_default_user_is_used() {
        let resolver = GuestIdentity::new("anonymous");
        assert_eq!(resolver.resolve(None).to_string(), "anonymous");
        assert_eq!(GuestIdentity::new("").resolve(None).as_str(), "guest");
    }
}
