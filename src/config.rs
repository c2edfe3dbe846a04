//! Document loading and CLI override handling.

use crate::model::TestDocument;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load and parse a test document from disk.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<TestDocument> {
    let path = path.as_ref();
    info!("Loading test document from {}", path.display());

    let content = fs::read_to_string(path).context(format!(
        "Failed to read test file: {}",
        path.display()
    ))?;

    let document: TestDocument =
        serde_json::from_str(&content).context(format!(
            "Failed to parse JSON from {}",
            path.display()
        ))?;

    debug!("Successfully loaded test document");
    Ok(document)
}

/// Parse repeated `KEY=VALUE` header overrides from the CLI.
pub fn parse_header_overrides(
    entries: &[String],
) -> Result<HashMap<String, String>> {
    let mut headers = HashMap::new();

    for entry in entries {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            anyhow!("Invalid header override '{entry}', expected KEY=VALUE")
        })?;
        if key.is_empty() {
            return Err(anyhow!(
                "Invalid header override '{entry}', empty header name"
            ));
        }
        headers.insert(key.to_string(), value.to_string());
    }

    Ok(headers)
}

/// Resolve the target host: the CLI override wins over the
/// document's `host` key; at least one must be present.
pub fn effective_host(
    document: &TestDocument,
    cli_host: Option<&str>,
) -> Result<String> {
    cli_host
        .map(str::to_string)
        .or_else(|| document.host.clone())
        .ok_or_else(|| {
            anyhow!("Missing 'host' key in document (and no --host given)")
        })
}

/// Global headers with CLI overrides merged on top (CLI wins).
pub fn effective_headers(
    document: &TestDocument,
    cli_headers: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut headers = document.headers.clone();
    for (key, value) in cli_headers {
        headers.insert(key.clone(), value.clone());
    }
    headers
}
