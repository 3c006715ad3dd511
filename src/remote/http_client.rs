use reqwest::StatusCode;
use serde_json::Value;

use super::{ApiRequest, DEFAULT_BASE_URL, Method, SCOPE_HEADER, Transport};
use crate::error::RemoteError;

/// `Transport` backed by a reqwest client.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent("tether")
            .build()
            .map_err(|e| RemoteError::local(format!("build http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn hosted() -> Result<Self, RemoteError> {
        Self::new(DEFAULT_BASE_URL)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, req: ApiRequest) -> Result<Value, RemoteError> {
        let method = match req.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, self.url(&req.path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", req.api_key),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(scope) = &req.scope {
            builder = builder.header(SCOPE_HEADER, scope);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| RemoteError::local(format!("{} {}: {e}", req.method.as_str(), req.path)))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RemoteError::local(format!("read {} body: {e}", req.path)))?;

        let payload = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(v) => v,
                Err(e) if status.is_success() => {
                    return Err(RemoteError::new(
                        status.as_u16(),
                        format!("invalid JSON body from {}: {e}", req.path),
                    ));
                }
                // Error responses are allowed to be non-JSON; the status
                // fallback below still produces a message.
                Err(_) => Value::Null,
            }
        };

        if !status.is_success() {
            let err = RemoteError::new(status.as_u16(), error_message(status, &payload));
            log::debug!("{} {} -> {}", req.method.as_str(), req.path, err);
            return Err(err);
        }

        log::debug!("{} {} -> {}", req.method.as_str(), req.path, status);
        Ok(payload)
    }
}

/// Prefers the server-supplied `error.message`, then falls back to a hint
/// for auth failures or the canonical status reason.
pub(super) fn error_message(status: StatusCode, payload: &Value) -> String {
    if let Some(msg) = payload
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return msg.to_string();
    }
    if status == StatusCode::UNAUTHORIZED {
        return "unauthorized (API key invalid or expired)".to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
