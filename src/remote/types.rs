//! DTOs for remote API responses.
//!
//! List endpoints wrap their payload in a `{ object: "list", data: [...] }`
//! envelope; the envelope is validated here at the boundary and stripped
//! before anything reaches the cache.

use serde::Deserialize;

use crate::model::{ChatSummary, Privacy, Project, Scope};

#[derive(Debug, Deserialize)]
pub struct FindChatsResponse {
    pub object: String,
    pub data: Vec<ChatSummary>,
}

#[derive(Debug, Deserialize)]
pub struct FindScopesResponse {
    pub object: String,
    pub data: Vec<Scope>,
}

#[derive(Debug, Deserialize)]
pub struct FindProjectsResponse {
    pub object: String,
    pub data: Vec<Project>,
}

/// Result of a fork: a newly created chat derived from the source. The
/// source collection's membership is unchanged; the id is handed to the
/// caller for navigation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ForkedChat {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub privacy: Option<Privacy>,
}

#[derive(Debug, Deserialize)]
pub struct AssignProjectResponse {
    pub id: String,
    #[serde(default)]
    pub assigned: bool,
}
