//! Config Resolver: validates the whole document, then expands the
//! test tree into a flat, declaration-ordered list of concrete cases.

use crate::model::{HttpMethod, ResponseExpectation, TestDocument, TestSpec};
use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// A fully resolved test case, ready for execution.
#[derive(Debug, Clone)]
pub struct ResolvedCase {
    /// Display label: the test name, prefixed with the path-prefix
    /// when the nested schema is in use.
    pub label: String,
    /// Verbs to issue, in declared order.
    pub methods: Vec<HttpMethod>,
    /// host + path-prefix + endpoint, by literal concatenation.
    pub url: String,
    pub queries: HashMap<String, String>,
    /// Global headers with per-test overrides applied.
    pub headers: HashMap<String, String>,
    /// Serialized request body (`{}` when the test declares none).
    pub body: String,
    pub skip: bool,
    pub response: Option<ResponseExpectation>,
}

/// Validate the document and expand it into concrete cases.
///
/// Every structural violation across the whole document is collected
/// before giving up, so a single error report names all offending
/// tests. No request is ever issued for a document that fails here.
pub fn resolve(
    document: &TestDocument,
    host: &str,
    global_headers: &HashMap<String, String>,
) -> Result<Vec<ResolvedCase>> {
    let groups = test_groups(document)?;

    let mut cases = Vec::new();
    let mut violations = Vec::new();

    for (prefix, tests) in &groups {
        for (name, raw) in tests.iter() {
            let label = case_label(prefix, name);
            match parse_spec(raw) {
                Ok(spec) => cases.push(build_case(
                    &label,
                    prefix,
                    &spec,
                    host,
                    global_headers,
                )?),
                Err(msg) => violations.push(format!("test '{label}': {msg}")),
            }
        }
    }

    if !violations.is_empty() {
        return Err(anyhow!(
            "Invalid test document:\n  {}",
            violations.join("\n  ")
        ));
    }

    debug!("Resolved {} test case(s)", cases.len());
    Ok(cases)
}

/// Dispatch on the document schema: nested `paths` or legacy flat
/// `tests`. Exactly one must be present.
fn test_groups(
    document: &TestDocument,
) -> Result<Vec<(String, Map<String, Value>)>> {
    match (&document.paths, &document.tests) {
        (Some(paths), None) => {
            let mut groups = Vec::new();
            for (prefix, value) in paths.iter() {
                let tests = value.as_object().ok_or_else(|| {
                    anyhow!(
                        "Invalid test document:\n  path '{prefix}': \
                         expected a mapping of test names to test specs"
                    )
                })?;
                groups.push((prefix.clone(), tests.clone()));
            }
            Ok(groups)
        }
        (None, Some(tests)) => Ok(vec![(String::new(), legacy_tests(tests)?)]),
        (Some(_), Some(_)) => Err(anyhow!(
            "Invalid test document: both 'paths' and 'tests' are present, \
             use exactly one"
        )),
        (None, None) => Err(anyhow!(
            "Invalid test document: missing 'paths' (or legacy 'tests') key"
        )),
    }
}

/// Normalize the legacy `tests` key into a name-keyed map.
///
/// The original format is an array of test objects each carrying a
/// `name` key; a name-keyed mapping is accepted as well.
fn legacy_tests(tests: &Value) -> Result<Map<String, Value>> {
    match tests {
        Value::Object(map) => Ok(map.clone()),
        Value::Array(list) => {
            let mut map = Map::new();
            for (idx, entry) in list.iter().enumerate() {
                let Some(obj) = entry.as_object() else {
                    return Err(anyhow!(
                        "Invalid test document: tests[{idx}] is not a \
                         test object"
                    ));
                };
                let name = obj
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        anyhow!(
                            "Invalid test document: tests[{idx}] is \
                             missing a 'name' key"
                        )
                    })?;
                let mut spec = obj.clone();
                spec.remove("name");
                if map
                    .insert(name.to_string(), Value::Object(spec))
                    .is_some()
                {
                    return Err(anyhow!(
                        "Invalid test document: duplicate test name \
                         '{name}'"
                    ));
                }
            }
            Ok(map)
        }
        other => Err(anyhow!(
            "Invalid test document: 'tests' must be an array of named \
             test objects or a mapping of test names to specs (got \
             {other})"
        )),
    }
}

fn case_label(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix} {name}")
    }
}

/// Convert one raw test entry into a typed spec, enforcing the
/// method/methods exclusivity rule.
fn parse_spec(raw: &Value) -> std::result::Result<TestSpec, String> {
    let spec: TestSpec = serde_json::from_value(raw.clone())
        .map_err(|e| e.to_string())?;

    match (&spec.method, &spec.methods) {
        (None, None) => Err("missing 'method' (or 'methods') key".into()),
        (Some(_), Some(_)) => {
            Err("both 'method' and 'methods' are present, use exactly one"
                .into())
        }
        (None, Some(ms)) if ms.is_empty() => {
            Err("'methods' must list at least one verb".into())
        }
        _ => Ok(spec),
    }
}

fn build_case(
    label: &str,
    prefix: &str,
    spec: &TestSpec,
    host: &str,
    global_headers: &HashMap<String, String>,
) -> Result<ResolvedCase> {
    let endpoint = spec.endpoint.as_deref().unwrap_or("");
    let url = format!("{host}{prefix}{endpoint}");

    let mut headers = global_headers.clone();
    for (key, value) in &spec.headers {
        headers.insert(key.clone(), value.clone());
    }

    let body = match &spec.body {
        Some(value) => serde_json::to_string(value)?,
        None => "{}".to_string(),
    };

    Ok(ResolvedCase {
        label: label.to_string(),
        methods: spec.declared_methods(),
        url,
        queries: spec.queries.clone(),
        headers,
        body,
        skip: spec.skip,
        response: spec.response.clone(),
    })
}
