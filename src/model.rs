//! Domain data model: stored profiles, derived identities, and the chat
//! collection items the cache synchronizes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A stored credential identity the user can switch between.
///
/// Ids are unique within the stored list. Profiles are created via
/// `ProfileStore::add_profile` and mutated when a default scope is set;
/// they are never deleted in-band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,

    /// Display label for the default scope, cached so the UI does not need
    /// a catalog round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scope_name: Option<String>,
}

/// The credential and default scope of "the currently active identity".
/// Derived by the resolver, never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveIdentity {
    pub api_key: Option<String>,
    pub default_scope: Option<String>,
}

impl ActiveIdentity {
    /// Callers gate network access on this; an unresolved identity is a
    /// representable state, not an error.
    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }
}

/// A sub-tenant qualifier narrowing which remote resources a request can
/// see. Read-only from this crate's perspective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Scope {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled Scope")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vercel_project_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Privacy {
    Public,
    Private,
    Team,
    TeamEdit,
    Unlisted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Pending,
    Completed,
    Failed,
}

/// Latest build/version attached to a chat, when the service reports one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestVersion {
    pub id: String,
    pub status: VersionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
}

/// One item of the synchronized collection.
///
/// Optional and deprecated fields are explicit `Option`s validated at the
/// transport boundary rather than trusted structurally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,

    #[serde(default)]
    pub shareable: bool,

    pub privacy: Privacy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Deprecated alias for `name`, still emitted by older API revisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// RFC 3339 timestamp. Kept as the wire string; parsed on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub favorite: bool,

    #[serde(default)]
    pub author_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<LatestVersion>,
}

impl ChatSummary {
    /// `name`, falling back to the deprecated `title`, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("Untitled Chat")
    }

    pub fn updated_at_time(&self) -> Option<OffsetDateTime> {
        let raw = self.updated_at.as_deref()?;
        OffsetDateTime::parse(raw, &Rfc3339).ok()
    }
}

/// The `(identity, scope)` pair a snapshot was fetched for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub api_key: String,
    pub scope: Option<String>,
}

/// Point-in-time materialization of the remote collection for one cache
/// key. Item ids are unique within a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub items: Vec<ChatSummary>,
    pub fetched_for: CacheKey,
}

impl Snapshot {
    pub fn get(&self, chat_id: &str) -> Option<&ChatSummary> {
        self.items.iter().find(|c| c.id == chat_id)
    }
}

/// Display ordering: favorited items first, then `updated_at` descending
/// within each partition. A pure derived view; the cache never reorders
/// its snapshot. Items without a parseable timestamp sort last in their
/// partition.
pub fn sorted_for_display(items: &[ChatSummary]) -> Vec<ChatSummary> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        b.favorite.cmp(&a.favorite).then_with(|| {
            let at = a.updated_at_time().unwrap_or(OffsetDateTime::UNIX_EPOCH);
            let bt = b.updated_at_time().unwrap_or(OffsetDateTime::UNIX_EPOCH);
            bt.cmp(&at)
        })
    });
    out
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
