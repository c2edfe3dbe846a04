//! HTTP execution seam.

use crate::model::HttpMethod;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// The parts of an HTTP response the assertion checks look at.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Capability to execute one concrete HTTP request.
///
/// The runner only talks to this trait, which keeps the execution
/// loop testable without a network.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        queries: &HashMap<String, String>,
        headers: &HashMap<String, String>,
        body: &str,
    ) -> Result<HttpResponse>;
}

/// reqwest-backed executor.
#[derive(Debug)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Build an executor with a per-request timeout in seconds.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    #[instrument(skip(self, queries, headers, body), fields(url = %url, method = %method))]
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        queries: &HashMap<String, String>,
        headers: &HashMap<String, String>,
        body: &str,
    ) -> Result<HttpResponse> {
        let mut req_builder =
            self.client.request(method.as_reqwest(), url);

        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }

        if !queries.is_empty() {
            req_builder = req_builder.query(queries);
        }

        // Header names are case-insensitive on the wire.
        let has_content_type = headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            req_builder =
                req_builder.header("Content-Type", "application/json");
        }
        req_builder = req_builder.body(body.to_string());

        debug!("Sending request to {}", url);
        let response = req_builder
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status().as_u16();
        debug!("Received response with status: {}", status);

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(HttpResponse { status, body })
    }
}
