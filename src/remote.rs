//! Remote service transport boundary.
//!
//! `Transport` executes an HTTP-shaped request and returns a parsed JSON
//! body or a typed failure; everything above it (cache, catalog,
//! coordinator) is written against the trait so tests can substitute an
//! in-memory fake.

use serde_json::Value;

use crate::error::RemoteError;
use crate::model::CacheKey;

mod http_client;
pub use self::http_client::HttpTransport;

mod types;
pub use self::types::*;

pub mod operations;

/// Base URL of the hosted service. Overridable at `HttpTransport`
/// construction for self-hosted or test deployments.
pub const DEFAULT_BASE_URL: &str = "https://api.v0.dev/v1";

/// Request header carrying the sub-tenant scope qualifier. Scope filtering
/// is server-side; the client never filters fetched items itself.
pub const SCOPE_HEADER: &str = "x-scope";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// An HTTP-shaped request: method, service-relative path, bearer
/// credential, optional scope qualifier, optional JSON body.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub api_key: String,
    pub scope: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, key: &CacheKey) -> Self {
        Self {
            method,
            path: path.into(),
            api_key: key.api_key.clone(),
            scope: key.scope.clone(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, req: ApiRequest) -> Result<Value, RemoteError>;
}
