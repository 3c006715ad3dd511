//! Client-side synchronization core for a remote chat collection.
//!
//! Keeps an in-memory snapshot of the chats visible to one credential
//! profile (optionally narrowed to a sub-tenant scope) consistent with the
//! remote service, while mutations (delete, favorite, fork, project
//! assignment, privacy changes) take effect locally at once and roll back
//! exactly if their remote call fails.
//!
//! Typical flow: open and load a [`profiles::ProfileStore`], resolve the
//! active identity with [`identity::CredentialResolver`], load a
//! [`cache::ChatCache`] for that identity (plus an optional scope from the
//! [`scopes::ScopeCatalog`]), then drive [`mutations::ChatMutations`].
//! Presentation layers consume [`cache::ChatCache::current`] snapshots and
//! the typed outcomes in [`error`]; this crate renders nothing.

pub mod cache;
pub mod error;
pub mod identity;
pub mod model;
pub mod mutations;
pub mod profiles;
pub mod remote;
pub mod scopes;
