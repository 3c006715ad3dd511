//! The named mutation operations, each configured as an optimistic
//! transform plus its remote call.
//!
//! Every operation takes its credentials from the cache's current key, so
//! invoking one before a successful load fails fast with `NotLoaded` and
//! an unresolved identity can never reach the network.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{ChatCache, Merge, Mutation, Transform, Validate};
use crate::error::{RemoteError, SyncError};
use crate::model::{CacheKey, ChatSummary, Privacy, Project};
use crate::remote::{ForkedChat, Transport, operations};

pub struct ChatMutations {
    cache: Arc<ChatCache>,
    transport: Arc<dyn Transport>,
}

impl ChatMutations {
    pub fn new(cache: Arc<ChatCache>, transport: Arc<dyn Transport>) -> Self {
        Self { cache, transport }
    }

    fn key(&self) -> Result<CacheKey, SyncError> {
        self.cache.key().ok_or(SyncError::NotLoaded)
    }

    /// Removes the chat from the local snapshot immediately; restores it
    /// if the remote delete fails.
    pub async fn delete(&self, chat_id: &str) -> Result<(), SyncError> {
        let key = self.key()?;
        let id = chat_id.to_string();
        let transform: Transform = Arc::new(move |items| items.retain(|c| c.id != id));
        self.cache
            .mutate(Mutation::new(operations::delete_chat(&key, chat_id), transform))
            .await?;
        Ok(())
    }

    /// Flips the favorite flag optimistically; on success the server's
    /// authoritative `favorite` value is merged back.
    pub async fn set_favorite(&self, chat_id: &str, favorite: bool) -> Result<(), SyncError> {
        let key = self.key()?;
        let id = chat_id.to_string();
        let transform: Transform = Arc::new(move |items| {
            if let Some(chat) = items.iter_mut().find(|c| c.id == id) {
                chat.favorite = favorite;
            }
        });
        let id = chat_id.to_string();
        let merge: Merge = Arc::new(move |items, resp| {
            if let Some(authoritative) = resp.get("favorite").and_then(Value::as_bool)
                && let Some(chat) = items.iter_mut().find(|c| c.id == id)
            {
                chat.favorite = authoritative;
            }
        });
        self.cache
            .mutate(
                Mutation::new(operations::set_favorite(&key, chat_id, favorite), transform)
                    .with_merge(merge),
            )
            .await?;
        Ok(())
    }

    /// Creates a derived chat. The source collection's membership is not
    /// changed, so this bypasses the optimistic primitive; the new id is
    /// returned for navigation.
    pub async fn fork(&self, chat_id: &str) -> Result<ForkedChat, SyncError> {
        let key = self.key()?;
        let value = self
            .transport
            .execute(operations::fork_chat(&key, chat_id))
            .await?;
        Ok(operations::parse_fork(value)?)
    }

    /// Assigns the chat to a project. The service acknowledges with
    /// `assigned: true`; anything else rolls the optimistic change back.
    pub async fn assign_project(&self, chat_id: &str, project_id: &str) -> Result<(), SyncError> {
        let key = self.key()?;
        let id = chat_id.to_string();
        let pid = project_id.to_string();
        let transform: Transform = Arc::new(move |items| {
            if let Some(chat) = items.iter_mut().find(|c| c.id == id) {
                chat.project_id = Some(pid.clone());
            }
        });
        let validate: Validate = Arc::new(|resp| {
            let parsed = operations::parse_assign(resp.clone())?;
            if parsed.assigned {
                Ok(())
            } else {
                Err(RemoteError::local("project assignment not acknowledged"))
            }
        });
        self.cache
            .mutate(
                Mutation::new(
                    operations::assign_project(&key, project_id, chat_id),
                    transform,
                )
                .with_validate(validate),
            )
            .await?;
        Ok(())
    }

    pub async fn set_privacy(&self, chat_id: &str, privacy: Privacy) -> Result<(), SyncError> {
        let key = self.key()?;
        let id = chat_id.to_string();
        let transform: Transform = Arc::new(move |items: &mut Vec<ChatSummary>| {
            if let Some(chat) = items.iter_mut().find(|c| c.id == id) {
                chat.privacy = privacy;
            }
        });
        self.cache
            .mutate(Mutation::new(
                operations::update_privacy(&key, chat_id, privacy),
                transform,
            ))
            .await?;
        Ok(())
    }

    /// Projects assignable to chats under the current identity.
    pub async fn list_projects(&self) -> Result<Vec<Project>, SyncError> {
        let key = self.key()?;
        let value = self
            .transport
            .execute(operations::find_projects(&key))
            .await?;
        Ok(operations::parse_projects(value)?)
    }

    /// Creates a project (typically to assign a chat to it right after).
    /// Does not touch the chat snapshot.
    pub async fn create_project(&self, name: &str) -> Result<Project, SyncError> {
        let key = self.key()?;
        let value = self
            .transport
            .execute(operations::create_project(&key, name))
            .await?;
        Ok(operations::parse_created_project(value)?)
    }
}
