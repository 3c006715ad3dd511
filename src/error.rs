//! Failure taxonomy for the sync core.
//!
//! Local preconditions (`NotAuthenticated`, `NotLoaded`) are returned
//! synchronously before any network attempt. `Remote` failures trigger
//! rollback for mutations and leave the previous snapshot intact for loads.
//! `Stale` marks a response that arrived after its cache key was switched
//! away; the snapshot is never touched and callers can ignore it.

/// A transport-level failure carrying the HTTP status and the
/// server-supplied message when one exists.
///
/// `status == 0` means the failure happened before an HTTP status existed
/// (connect error, invalid response body).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("remote call failed ({status}): {message}")]
pub struct RemoteError {
    pub status: u16,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A failure with no HTTP status (connect error, undecodable body).
    pub fn local(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// No resolvable credential. Dependent components must not issue a
    /// request in this state; this is never surfaced as a remote failure.
    #[error("not authenticated (no API key resolved)")]
    NotAuthenticated,

    /// A mutation was issued before the collection was loaded.
    #[error("collection not loaded")]
    NotLoaded,

    /// The cache key changed while this call was in flight. The result was
    /// discarded and the snapshot is untouched.
    #[error("response discarded (cache key changed while in flight)")]
    Stale,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Profile storage failure. Local storage is an ambient concern and kept
/// out of the sync taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Format {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported profile store version {0}")]
    Version(u32),

    #[error("duplicate profile id {0}")]
    DuplicateProfileId(String),

    #[error("no profile with id {0}")]
    UnknownProfileId(String),

    #[error("profile store not loaded")]
    NotLoaded,
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn format(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Format {
            context: context.into(),
            source,
        }
    }
}
