//! Request builders and boundary parsers for every remote operation the
//! core issues.
//!
//! Builders are pure (`CacheKey` in, `ApiRequest` out) so the cache can
//! execute them later without re-deriving credentials; parsers validate
//! the loosely-typed response shapes here instead of letting raw JSON leak
//! upward.

use serde_json::{Value, json};

use super::{
    ApiRequest, AssignProjectResponse, FindChatsResponse, FindProjectsResponse,
    FindScopesResponse, ForkedChat, Method,
};
use crate::error::RemoteError;
use crate::model::{CacheKey, ChatSummary, Privacy, Project, Scope};

pub fn find_chats(key: &CacheKey) -> ApiRequest {
    ApiRequest::new(Method::Get, "/chats", key)
}

pub fn delete_chat(key: &CacheKey, chat_id: &str) -> ApiRequest {
    ApiRequest::new(Method::Delete, format!("/chats/{chat_id}"), key)
}

pub fn set_favorite(key: &CacheKey, chat_id: &str, favorite: bool) -> ApiRequest {
    ApiRequest::new(Method::Put, format!("/chats/{chat_id}/favorite"), key)
        .with_body(json!({ "isFavorite": favorite }))
}

pub fn fork_chat(key: &CacheKey, chat_id: &str) -> ApiRequest {
    ApiRequest::new(Method::Post, format!("/chats/{chat_id}/fork"), key)
}

pub fn assign_project(key: &CacheKey, project_id: &str, chat_id: &str) -> ApiRequest {
    ApiRequest::new(Method::Post, format!("/projects/{project_id}/assign"), key)
        .with_body(json!({ "chatId": chat_id }))
}

pub fn update_privacy(key: &CacheKey, chat_id: &str, privacy: Privacy) -> ApiRequest {
    ApiRequest::new(Method::Patch, format!("/chats/{chat_id}"), key)
        .with_body(json!({ "privacy": privacy }))
}

/// Scope listing is account-wide; it never carries a scope qualifier.
pub fn find_scopes(api_key: &str) -> ApiRequest {
    ApiRequest {
        method: Method::Get,
        path: "/user/scopes".to_string(),
        api_key: api_key.to_string(),
        scope: None,
        body: None,
    }
}

pub fn find_projects(key: &CacheKey) -> ApiRequest {
    ApiRequest::new(Method::Get, "/projects", key)
}

pub fn create_project(key: &CacheKey, name: &str) -> ApiRequest {
    ApiRequest::new(Method::Post, "/projects", key).with_body(json!({ "name": name }))
}

fn decode<T: serde::de::DeserializeOwned>(what: &str, value: Value) -> Result<T, RemoteError> {
    serde_json::from_value(value)
        .map_err(|e| RemoteError::local(format!("unexpected {what} payload: {e}")))
}

pub fn parse_chats(value: Value) -> Result<Vec<ChatSummary>, RemoteError> {
    let resp: FindChatsResponse = decode("chat list", value)?;
    Ok(resp.data)
}

pub fn parse_scopes(value: Value) -> Result<Vec<Scope>, RemoteError> {
    let resp: FindScopesResponse = decode("scope list", value)?;
    Ok(resp.data)
}

pub fn parse_projects(value: Value) -> Result<Vec<Project>, RemoteError> {
    let resp: FindProjectsResponse = decode("project list", value)?;
    Ok(resp.data)
}

pub fn parse_fork(value: Value) -> Result<ForkedChat, RemoteError> {
    decode("fork", value)
}

pub fn parse_created_project(value: Value) -> Result<Project, RemoteError> {
    decode("created project", value)
}

pub fn parse_assign(value: Value) -> Result<AssignProjectResponse, RemoteError> {
    decode("assign project", value)
}
