#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bazaar_api::{
    BufferedNotifier, Transport, TransportError, TransportRequest, TransportResponse,
};
use bazaar_client::ResourceClient;
use serde_json::{Value, json};

/// Transport stub that replays a queued sequence of outcomes and records
/// every request it saw.
#[derive(Clone, Default)]
pub struct StubTransport {
    outcomes: Arc<Mutex<VecDeque<Result<TransportResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: Value) {
        self.outcomes
            .lock()
            .expect("outcomes mutex")
            .push_back(Ok(TransportResponse { status, body }));
    }

    pub fn push_error(&self, error: TransportError) {
        self.outcomes
            .lock()
            .expect("outcomes mutex")
            .push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests mutex").len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("requests mutex").push(request);
        self.outcomes
            .lock()
            .expect("outcomes mutex")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionFailed("stub exhausted".into())))
    }
}

pub struct Harness {
    pub transport: StubTransport,
    pub notifier: BufferedNotifier,
    pub client: ResourceClient,
}

pub fn harness() -> Harness {
    let transport = StubTransport::new();
    let notifier = BufferedNotifier::default();
    let client = ResourceClient::new(
        Arc::new(transport.clone()),
        Arc::new(notifier.clone()),
    );
    Harness {
        transport,
        notifier,
        client,
    }
}

/// Wrap a payload in the wire envelope.
pub fn ok_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn failed_envelope(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

/// A wire-convention (camelCase) listing payload.
pub fn wire_listing(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Desk lamp",
        "description": "Barely used",
        "category": "furniture",
        "priceCents": 1500,
        "sellerId": "s1",
        "isFavorite": false,
    })
}
