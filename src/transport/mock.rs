//! Scripted transport for tests and offline use

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{FetchOptions, Transport};
use crate::error::TransportError;

/// One scripted outcome
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Successful retrieval with this body
    Body(Vec<u8>),
    /// Server answered with a non-success status
    Status(u16),
    /// Connection-level failure
    Unavailable(String),
}

impl MockReply {
    /// Successful retrieval of a JSON document
    pub fn json(value: serde_json::Value) -> Self {
        MockReply::Body(value.to_string().into_bytes())
    }
}

/// A retrieval the transport was asked to perform
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub options: FetchOptions,
}

#[derive(Debug, Default)]
struct State {
    replies: VecDeque<MockReply>,
    fallback: Option<MockReply>,
    calls: Vec<RecordedCall>,
}

/// In-memory transport returning queued replies in order.
///
/// Once the queue is empty the fallback reply (if any) is repeated; with no
/// fallback the call fails with `TransportError::Unavailable`. Clones share
/// the same script and call log.
///
/// # Example
///
/// ```rust
/// use model_method::transport::{FetchOptions, MockReply, MockTransport, Transport};
/// use serde_json::json;
///
/// # async fn example() {
/// let transport = MockTransport::new();
/// transport.push(MockReply::json(json!({"objects": []})));
///
/// let _body = transport.retrieve("mock://x", &FetchOptions::new()).await.unwrap();
/// assert_eq!(transport.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that answers every call with `reply`
    pub fn always(reply: MockReply) -> Self {
        let transport = Self::new();
        transport.lock().fallback = Some(reply);
        transport
    }

    /// Queue a reply for the next unanswered call
    pub fn push(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn retrieve(
        &self,
        endpoint: &str,
        options: &FetchOptions,
    ) -> Result<Vec<u8>, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.calls.push(RecordedCall {
                endpoint: endpoint.to_string(),
                options: options.clone(),
            });
            state.replies.pop_front().or_else(|| state.fallback.clone())
        };

        match reply {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Status(status)) => Err(TransportError::Status {
                status,
                endpoint: endpoint.to_string(),
            }),
            Some(MockReply::Unavailable(reason)) => Err(TransportError::Unavailable(reason)),
            None => Err(TransportError::Unavailable(format!(
                "no scripted reply for {}",
                endpoint
            ))),
        }
    }
}
