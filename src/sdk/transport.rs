//! HTTP transport seam used by [`Context`](crate::sdk::Context).
//!
//! The default transport is a [`reqwest::Client`]. Tests and callers that
//! want to share a connection pool can inject their own.

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use crate::error::{Error, Result};
use crate::VERSION;

/// User agent string for API requests.
fn user_agent() -> String {
    format!("splunk-sdk-rust/{}", VERSION)
}

/// Sends prepared requests and returns as soon as response headers arrive.
///
/// Implementations must be safe to call from many in-flight requests at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request. The response body is not read.
    async fn execute(&self, request: Request) -> Result<Response>;

    /// Release any resources held by the transport. Called at most once.
    fn shutdown(&self) {}
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(Client::execute(self, request).await?)
    }
}

/// Build the default reqwest client.
///
/// No request timeout is configured; callers own cancellation.
pub fn default_client() -> Result<Client> {
    Client::builder()
        .user_agent(user_agent())
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))
}
