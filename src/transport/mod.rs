//! Transports that retrieve the remote resource
//!
//! - `HttpTransport`: GET over HTTP(S) via reqwest
//! - `MockTransport`: scripted in-memory replies, records every call

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport, RecordedCall};

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TransportError;

/// Options forwarded unmodified to the transport for one retrieval
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Extra request headers
    pub headers: Vec<(String, String)>,

    /// Overrides the transport's default timeout for this call
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Retrieves the raw body of a remote resource.
///
/// Timeouts belong to the implementation; nothing in this crate retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn retrieve(
        &self,
        endpoint: &str,
        options: &FetchOptions,
    ) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn retrieve(
        &self,
        endpoint: &str,
        options: &FetchOptions,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).retrieve(endpoint, options).await
    }
}
