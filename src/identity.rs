//! Credential/scope resolution: which stored profile (or legacy fallback
//! credential) is active for outgoing requests.

use std::sync::Arc;

use crate::model::ActiveIdentity;
use crate::profiles::{Preferences, ProfileData, ProfileStore};

/// Pure function of ProfileStore state; recompute after any store change.
pub struct CredentialResolver {
    store: Arc<ProfileStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<ProfileStore>) -> Self {
        Self { store }
    }

    /// False while the store's initial load has not completed.
    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    /// Resolves the active identity. Before the store is ready, or when no
    /// credential exists, the identity is unresolved (`api_key: None`)
    /// rather than an error; callers gate requests on `is_authenticated`.
    pub fn resolve(&self) -> ActiveIdentity {
        match self.store.loaded() {
            Some((data, prefs)) => resolve_identity(&data, &prefs),
            None => ActiveIdentity::default(),
        }
    }
}

/// Resolution precedence, evaluated in order:
/// 1. An active profile id pointing at an existing profile wins outright.
/// 2. Otherwise the legacy preference key applies; its default scope only
///    when no active id was ever set (an active id pointing at a missing
///    profile falls back to the key alone).
/// 3. Otherwise unresolved.
///
/// Empty strings normalize to `None` before the rules run.
pub fn resolve_identity(data: &ProfileData, prefs: &Preferences) -> ActiveIdentity {
    let active_id = normalize(data.active_profile_id.as_deref());

    let mut api_key: Option<String> = None;
    let mut default_scope: Option<String> = None;

    if let Some(id) = &active_id
        && let Some(profile) = data.profiles.iter().find(|p| &p.id == id)
    {
        api_key = normalize(Some(&profile.api_key));
        default_scope = normalize(profile.default_scope.as_deref());
    }

    if api_key.is_none() {
        api_key = normalize(prefs.api_key.as_deref());
        if active_id.is_none() {
            default_scope = normalize(prefs.default_scope.as_deref());
        }
    }

    ActiveIdentity {
        api_key,
        default_scope,
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
