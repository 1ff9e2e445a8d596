use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::ports::IdentityGateway;
use crate::domain::{
    entities::{Attributes, Identity, NewIdentity},
    errors::{GatewayError, GatewayResult},
};

/// A gateway call as observed by [`InMemoryIdentityGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Create { handle: String, send_invite: bool },
    Enable { handle: String },
    Disable { handle: String },
    SetPassword { handle: String, permanent: bool },
    AddToGroup { handle: String, group: String },
    Get { handle: String },
    List { limit: i32, filter: Option<String> },
    ListGroups { handle: String },
    UpdateAttributes { handle: String, keys: Vec<String> },
}

type CallMatcher = Box<dyn Fn(&GatewayCall) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
struct StoredIdentity {
    identity: Identity,
    password: String,
    password_permanent: bool,
}

/// In-process identity provider double.
///
/// Records every call in arrival order (failed ones included) and can be
/// told to fail calls matching a predicate.
pub struct InMemoryIdentityGateway {
    identities: Mutex<BTreeMap<String, StoredIdentity>>,
    calls: Mutex<Vec<GatewayCall>>,
    failures: Mutex<Vec<(CallMatcher, GatewayError)>>,
    default_limit: i32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryIdentityGateway {
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            default_limit: 20,
        }
    }

    /// Seed an existing identity
    pub fn with_identity(self, identity: Identity) -> Self {
        self.insert(identity);
        self
    }

    pub fn insert(&self, identity: Identity) {
        lock(&self.identities).insert(
            identity.handle.clone(),
            StoredIdentity {
                identity,
                password: String::new(),
                password_permanent: false,
            },
        );
    }

    /// Fail every call matching `matches` with `error`
    pub fn fail_when<F>(&self, matches: F, error: GatewayError)
    where
        F: Fn(&GatewayCall) -> bool + Send + Sync + 'static,
    {
        lock(&self.failures).push((Box::new(matches), error));
    }

    /// Fail group assignment for a specific group
    pub fn fail_on_group(&self, group: &str, error: GatewayError) {
        let group = group.to_string();
        self.fail_when(
            move |call| matches!(call, GatewayCall::AddToGroup { group: g, .. } if *g == group),
            error,
        );
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn count_calls<F: Fn(&GatewayCall) -> bool>(&self, matches: F) -> usize {
        lock(&self.calls).iter().filter(|call| matches(call)).count()
    }

    pub fn stored(&self, handle: &str) -> Option<Identity> {
        lock(&self.identities)
            .get(handle)
            .map(|stored| stored.identity.clone())
    }

    /// Current password and whether it was set as permanent
    pub fn password_of(&self, handle: &str) -> Option<(String, bool)> {
        lock(&self.identities)
            .get(handle)
            .map(|stored| (stored.password.clone(), stored.password_permanent))
    }

    fn record(&self, call: GatewayCall) -> GatewayResult<()> {
        let failure = lock(&self.failures)
            .iter()
            .find(|(matches, _)| matches(&call))
            .map(|(_, error)| error.clone());

        lock(&self.calls).push(call);

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_stored<T>(
        &self,
        handle: &str,
        f: impl FnOnce(&mut StoredIdentity) -> T,
    ) -> GatewayResult<T> {
        let mut identities = lock(&self.identities);
        identities
            .get_mut(handle)
            .map(f)
            .ok_or_else(|| GatewayError::UserNotFound {
                handle: handle.to_string(),
            })
    }
}

impl Default for InMemoryIdentityGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal support for the provider's `attr = "value"` and `attr ^= "prefix"` filters
fn matches_filter(identity: &Identity, filter: &str) -> GatewayResult<bool> {
    let (name, op, value) = if let Some((name, value)) = filter.split_once("^=") {
        (name, "^=", value)
    } else if let Some((name, value)) = filter.split_once('=') {
        (name, "=", value)
    } else {
        return Err(GatewayError::rejected(
            "InvalidParameterException",
            format!("Invalid filter: {filter}"),
        ));
    };

    let name = name.trim();
    let value = value.trim().trim_matches('"');
    let actual = match name {
        "username" => identity.handle.as_str(),
        "status" if identity.active => "Enabled",
        "status" => "Disabled",
        other => match identity.attribute(other) {
            Some(actual) => actual,
            None => return Ok(false),
        },
    };

    Ok(if op == "=" {
        actual == value
    } else {
        actual.starts_with(value)
    })
}

#[async_trait]
impl IdentityGateway for InMemoryIdentityGateway {
    async fn create(&self, candidate: &NewIdentity, send_invite: bool) -> GatewayResult<Identity> {
        self.record(GatewayCall::Create {
            handle: candidate.handle.clone(),
            send_invite,
        })?;

        let mut identities = lock(&self.identities);
        if identities.contains_key(&candidate.handle) {
            return Err(GatewayError::rejected(
                "UsernameExistsException",
                "User account already exists",
            ));
        }

        let identity = candidate.to_identity();
        identities.insert(
            candidate.handle.clone(),
            StoredIdentity {
                identity: identity.clone(),
                password: candidate.password().to_string(),
                password_permanent: false,
            },
        );
        Ok(identity)
    }

    async fn enable(&self, handle: &str) -> GatewayResult<()> {
        self.record(GatewayCall::Enable {
            handle: handle.to_string(),
        })?;
        self.with_stored(handle, |stored| stored.identity.active = true)
    }

    async fn disable(&self, handle: &str) -> GatewayResult<()> {
        self.record(GatewayCall::Disable {
            handle: handle.to_string(),
        })?;
        self.with_stored(handle, |stored| stored.identity.active = false)
    }

    async fn set_password(
        &self,
        handle: &str,
        password: &str,
        permanent: bool,
    ) -> GatewayResult<()> {
        self.record(GatewayCall::SetPassword {
            handle: handle.to_string(),
            permanent,
        })?;
        self.with_stored(handle, |stored| {
            stored.password = password.to_string();
            stored.password_permanent = permanent;
        })
    }

    async fn add_to_group(&self, handle: &str, group: &str) -> GatewayResult<()> {
        self.record(GatewayCall::AddToGroup {
            handle: handle.to_string(),
            group: group.to_string(),
        })?;
        self.with_stored(handle, |stored| {
            stored.identity.groups.insert(group.to_string());
        })
    }

    async fn get(&self, handle: &str) -> GatewayResult<Identity> {
        self.record(GatewayCall::Get {
            handle: handle.to_string(),
        })?;
        self.with_stored(handle, |stored| stored.identity.clone())
    }

    async fn list(&self, limit: i32, filter: Option<&str>) -> GatewayResult<Vec<Identity>> {
        self.record(GatewayCall::List {
            limit,
            filter: filter.map(str::to_string),
        })?;

        let page = if limit > 0 { limit } else { self.default_limit };
        let page = usize::try_from(page).unwrap_or_default();
        let identities = lock(&self.identities);

        let mut listed = Vec::new();
        for stored in identities.values() {
            if listed.len() == page {
                break;
            }
            let keep = match filter.filter(|f| !f.trim().is_empty()) {
                Some(f) => matches_filter(&stored.identity, f)?,
                None => true,
            };
            if keep {
                listed.push(stored.identity.clone());
            }
        }
        Ok(listed)
    }

    async fn list_groups(&self, handle: &str) -> GatewayResult<Vec<String>> {
        self.record(GatewayCall::ListGroups {
            handle: handle.to_string(),
        })?;
        self.with_stored(handle, |stored| {
            stored.identity.groups.iter().cloned().collect()
        })
    }

    async fn update_attributes(
        &self,
        handle: &str,
        attributes: &Attributes,
    ) -> GatewayResult<()> {
        let mut keys: Vec<String> = attributes.iter().map(|(k, _)| k.to_string()).collect();
        keys.sort();
        self.record(GatewayCall::UpdateAttributes {
            handle: handle.to_string(),
            keys,
        })?;
        self.with_stored(handle, |stored| stored.identity.attributes.merge(attributes))
    }
}
