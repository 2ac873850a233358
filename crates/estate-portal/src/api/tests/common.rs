use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::QueryCache;
use crate::client::PortalClient;
use crate::http::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::toast::RecordingNotifier;

#[derive(Debug, Clone)]
pub(super) enum Reply {
    Status(u16, String),
    Unreachable,
}

impl Reply {
    pub(super) fn json(status: u16, body: Value) -> Self {
        Reply::Status(status, body.to_string())
    }

    pub(super) fn empty(status: u16) -> Self {
        Reply::Status(status, String::new())
    }
}

/// Answers requests from per-route queues. The last reply of a route repeats.
#[derive(Default, Clone)]
pub(super) struct ScriptedTransport {
    routes: Arc<Mutex<HashMap<(String, String), VecDeque<Reply>>>>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub(super) fn on(&self, method: &str, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .expect("route mutex poisoned")
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub(super) fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    pub(super) fn sent_to(&self, path: &str) -> Vec<ApiRequest> {
        self.sent()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let route = (request.method.as_str().to_string(), request.path.clone());
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(request);

        let reply = {
            let mut routes = self.routes.lock().expect("route mutex poisoned");
            match routes.get_mut(&route) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Status(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(Reply::Unreachable) => {
                Err(TransportError::Connect("connection refused".to_string()))
            }
            None => Ok(ApiResponse::new(
                404,
                format!(r#"{{"message":"no route for {} {}"}}"#, route.0, route.1),
            )),
        }
    }
}

pub(super) type TestClient = PortalClient<ScriptedTransport, RecordingNotifier>;

pub(super) fn client() -> (TestClient, ScriptedTransport, RecordingNotifier) {
    let transport = ScriptedTransport::default();
    let notifier = RecordingNotifier::default();
    let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
    let client = PortalClient::new(transport.clone(), cache, notifier.clone());
    (client, transport, notifier)
}

pub(super) fn query_value<'r>(request: &'r ApiRequest, name: &str) -> Option<&'r str> {
    request
        .query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

pub(super) fn estate_json(id: u64, title: &str) -> Value {
    serde_json::json!({ "id": id, "title": title, "price": 65000, "status": "available" })
}
