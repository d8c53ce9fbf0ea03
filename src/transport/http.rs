//! HttpTransport: GET retrieval over HTTP(S)

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use tracing::debug;

use super::{FetchOptions, Transport};
use crate::config::TransportConfig;
use crate::error::TransportError;

/// Transport backed by a shared `reqwest::Client`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client from transport settings
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
    Ok((header_name, header_value))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn retrieve(
        &self,
        endpoint: &str,
        options: &FetchOptions,
    ) -> Result<Vec<u8>, TransportError> {
        let mut request = self
            .client
            .get(endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)?;
            request = request.header(name, value);
        }

        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        debug!(endpoint, headers = options.headers.len(), "GET computed value");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.bytes().await?;
        debug!(endpoint, bytes = body.len(), "Received response body");

        Ok(body.to_vec())
    }
}
