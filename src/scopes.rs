//! Cached catalog of the sub-tenant scopes visible to an API key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::SyncError;
use crate::model::Scope;
use crate::remote::{Transport, operations};

/// Listing result. `ready: false` means no credential was available and no
/// request was issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeListing {
    pub ready: bool,
    pub scopes: Vec<Scope>,
}

pub struct ScopeCatalog {
    transport: Arc<dyn Transport>,
    cache: Mutex<HashMap<String, Vec<Scope>>>,
}

impl ScopeCatalog {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Lists the scopes visible to `api_key`, cached per key. A missing
    /// key never issues a request. Remote failures surface as typed errors
    /// and are not retried; the next call fetches again.
    pub async fn list(&self, api_key: Option<&str>) -> Result<ScopeListing, SyncError> {
        let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
            return Ok(ScopeListing {
                ready: false,
                scopes: Vec::new(),
            });
        };

        if let Some(hit) = self.cache.lock().unwrap().get(api_key) {
            return Ok(ScopeListing {
                ready: true,
                scopes: hit.clone(),
            });
        }

        let value = self.transport.execute(operations::find_scopes(api_key)).await?;
        let scopes = operations::parse_scopes(value)?;
        self.cache
            .lock()
            .unwrap()
            .insert(api_key.to_string(), scopes.clone());
        Ok(ScopeListing {
            ready: true,
            scopes,
        })
    }

    /// Drops the cached listing for `api_key`; the next `list` refetches.
    pub fn invalidate(&self, api_key: &str) {
        self.cache.lock().unwrap().remove(api_key);
    }
}
