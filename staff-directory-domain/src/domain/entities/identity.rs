use super::common::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A staff account as confirmed by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub handle: String,
    pub active: bool,
    pub attributes: Attributes,
    pub groups: BTreeSet<String>,
}

impl Identity {
    pub fn new(handle: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            handle: handle.into(),
            active: true,
            attributes,
            groups: BTreeSet::new(),
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn status(&self) -> IdentityStatus {
        IdentityStatus::from_active(self.active)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Copy of this identity with the present keys of `partial` applied
    pub fn merged_with(&self, partial: &Attributes) -> Self {
        let mut merged = self.clone();
        merged.attributes.merge(partial);
        merged
    }
}

/// Lifecycle view derived from [`Identity::active`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentityStatus {
    Active,
    Inactive,
}

impl IdentityStatus {
    pub fn from_active(active: bool) -> Self {
        if active {
            IdentityStatus::Active
        } else {
            IdentityStatus::Inactive
        }
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStatus::Active => write!(f, "ACTIVE"),
            IdentityStatus::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Creation input; the password travels beside the attributes, never inside them
#[derive(Clone)]
pub struct NewIdentity {
    pub handle: String,
    pub attributes: Attributes,
    password: String,
}

impl NewIdentity {
    pub fn new(
        handle: impl Into<String>,
        attributes: Attributes,
        password: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            attributes,
            password: password.into(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(key, value);
        self
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Identity the provider is expected to hold once creation succeeds
    pub fn to_identity(&self) -> Identity {
        Identity::new(self.handle.clone(), self.attributes.clone())
    }
}

impl fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewIdentity")
            .field("handle", &self.handle)
            .field("attributes", &self.attributes)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
