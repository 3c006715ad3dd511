#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::sync::oneshot;

use tether::error::RemoteError;
use tether::model::ActiveIdentity;
use tether::remote::{ApiRequest, Method, Transport};

struct Scripted {
    result: Result<Value, RemoteError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// In-memory transport scripted per `METHOD path`. Responses are consumed
/// in FIFO order; gated responses suspend until the returned sender is
/// used (or dropped), which lets tests control resolution order.
#[derive(Default)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn slot(method: Method, path: &str) -> String {
        format!("{} {}", method.as_str(), path)
    }

    pub fn respond(&self, method: Method, path: &str, result: Result<Value, RemoteError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(Self::slot(method, path))
            .or_default()
            .push_back(Scripted { result, gate: None });
    }

    pub fn respond_gated(
        &self,
        method: Method,
        path: &str,
        result: Result<Value, RemoteError>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.scripts
            .lock()
            .unwrap()
            .entry(Self::slot(method, path))
            .or_default()
            .push_back(Scripted {
                result,
                gate: Some(rx),
            });
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .expect("at least one request")
            .clone()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, req: ApiRequest) -> Result<Value, RemoteError> {
        self.requests.lock().unwrap().push(req.clone());
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&Self::slot(req.method, &req.path))
            .and_then(|queue| queue.pop_front());
        let Some(scripted) = scripted else {
            panic!("unexpected request: {} {}", req.method.as_str(), req.path);
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }
}

/// Yields until the fake has seen `n` requests; panics if that never
/// happens (a task is stuck before reaching the transport).
pub async fn wait_for_requests(fake: &FakeTransport, n: usize) {
    for _ in 0..1000 {
        if fake.request_count() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("transport never saw {n} requests (saw {})", fake.request_count());
}

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn identity(api_key: &str, default_scope: Option<&str>) -> ActiveIdentity {
    ActiveIdentity {
        api_key: Some(api_key.to_string()),
        default_scope: default_scope.map(str::to_string),
    }
}

/// `{object: "list", data: [...]}` chat payload with `(id, favorite)`
/// pairs.
pub fn chats_payload(chats: &[(&str, bool)]) -> Value {
    let data: Vec<Value> = chats
        .iter()
        .map(|(id, favorite)| {
            json!({
                "id": id,
                "privacy": "private",
                "favorite": favorite,
                "authorId": "author-1",
                "updatedAt": "2026-01-01T00:00:00Z",
            })
        })
        .collect();
    json!({ "object": "list", "data": data })
}
