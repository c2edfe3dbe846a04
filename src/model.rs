//! Typed data model for the JSON test document.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Top-level test document.
///
/// Two schemas are accepted: the current one groups tests under
/// `paths` (path-prefix -> test-name -> [`TestSpec`]), the legacy
/// one keeps a flat `tests` key, either an array of named test
/// objects (`[{"name": ..., "method": ...}, ...]`, the original
/// format) or a test-name -> spec mapping. Exactly one of the two
/// keys must be present. Inner containers stay untyped and
/// order-preserving so tests run in declaration order; each entry
/// is converted to a typed [`TestSpec`] during the validation pass
/// in the resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct TestDocument {
    /// Target host, e.g. `http://localhost:8080`. May be omitted
    /// when overridden from the CLI.
    #[serde(default)]
    pub host: Option<String>,
    /// Nested schema: path-prefix -> test-name -> spec.
    #[serde(default)]
    pub paths: Option<Map<String, Value>>,
    /// Legacy schema: array of named test objects, or a
    /// test-name -> spec mapping. Shape-checked in the resolver.
    #[serde(default)]
    pub tests: Option<Value>,
    /// Headers applied to every request unless overridden per test.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// One declarative HTTP test definition.
#[derive(Debug, Clone, Deserialize)]
pub struct TestSpec {
    /// Single HTTP verb. Mutually exclusive with `methods`.
    #[serde(default)]
    pub method: Option<HttpMethod>,
    /// Ordered list of HTTP verbs, one request issued per verb.
    #[serde(default)]
    pub methods: Option<Vec<HttpMethod>>,
    /// Suffix appended to the path-prefix to form the full URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Query parameters.
    #[serde(default)]
    pub queries: HashMap<String, String>,
    /// Per-test headers, merged over the global headers (local wins).
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request body, serialized to JSON text. Defaults to `{}`.
    #[serde(default)]
    pub body: Option<Value>,
    /// Skip this test entirely (no request, no counters).
    #[serde(default)]
    pub skip: bool,
    /// Expected response. Absent means fire-and-forget: the request
    /// is issued but never scored.
    #[serde(default)]
    pub response: Option<ResponseExpectation>,
}

impl TestSpec {
    /// The declared verbs in order, regardless of which of the two
    /// mutually exclusive forms was used. The resolver guarantees
    /// exactly one form is present before this is called.
    pub fn declared_methods(&self) -> Vec<HttpMethod> {
        match (&self.method, &self.methods) {
            (Some(m), None) => vec![*m],
            (None, Some(ms)) => ms.clone(),
            _ => Vec::new(),
        }
    }
}

/// Declarative expectations checked against the HTTP response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseExpectation {
    /// Exact status code.
    #[serde(default)]
    pub code: Option<u16>,
    /// Expected length of the parsed JSON body (array or object).
    #[serde(default)]
    pub nb_json_items: Option<usize>,
    /// Exact match against the decoded body text.
    #[serde(default, rename = "content-string-exact")]
    pub content_string_exact: Option<String>,
    /// Deep structural equality against the parsed JSON body.
    #[serde(default, rename = "content-json-exact")]
    pub content_json_exact: Option<Value>,
    /// Subset-key equality: every listed key must exist in the
    /// response object with an exactly equal value.
    #[serde(default, rename = "content-json-partial")]
    pub content_json_partial: Option<Map<String, Value>>,
}

/// Finite set of supported HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

/// Counters for one run of one document against one host.
///
/// `skipped` is informational only; it never feeds `total` or
/// `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests issued (one per method per non-skipped case).
    pub total: usize,
    /// Failed invocations (assertion or transport failures).
    pub failed: usize,
    /// Cases skipped via `skip: true`.
    pub skipped: usize,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.total - self.failed
    }
}
