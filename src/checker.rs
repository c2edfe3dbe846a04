//! Assertion Evaluator: ordered response checks.

use crate::executor::HttpResponse;
use crate::model::ResponseExpectation;
use serde_json::Value;

/// Outcome of evaluating one response against its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No `response` key was declared: the request was fire-and-forget.
    Unchecked,
    Pass,
    Fail(String),
}

impl CheckOutcome {
    pub fn is_fail(&self) -> bool {
        matches!(self, CheckOutcome::Fail(_))
    }
}

/// Evaluate the declared checks in order. The first failing check
/// short-circuits the rest; checks are not cumulative.
///
/// Order: `code`, `nb_json_items`, `content-string-exact`,
/// `content-json-exact`, `content-json-partial`.
pub fn evaluate(
    expect: Option<&ResponseExpectation>,
    response: &HttpResponse,
) -> CheckOutcome {
    let Some(expect) = expect else {
        return CheckOutcome::Unchecked;
    };

    if let Some(expected) = expect.code {
        if expected != response.status {
            return CheckOutcome::Fail(format!(
                "Expected status {expected} but got {}",
                response.status
            ));
        }
    }

    // The JSON-based checks parse the body lazily and share one
    // cached result; a body that never needs parsing never fails
    // for being unparseable.
    let mut body_json = BodyJson::new(&response.body);

    if let Some(expected) = expect.nb_json_items {
        match body_json.parsed() {
            Ok(json) => match json_len(json) {
                Some(len) if len == expected => {}
                Some(len) => {
                    return CheckOutcome::Fail(format!(
                        "Expected {expected} json items but got {len}"
                    ));
                }
                None => {
                    return CheckOutcome::Fail(
                        "nb_json_items: response JSON has no length \
                         (expected an array or object)"
                            .to_string(),
                    );
                }
            },
            Err(e) => {
                return CheckOutcome::Fail(format!(
                    "nb_json_items: response is not valid JSON: {e}"
                ));
            }
        }
    }

    if let Some(expected) = &expect.content_string_exact {
        if expected != &response.body {
            return CheckOutcome::Fail(format!(
                "Expected body '{expected}' but got '{}'",
                response.body
            ));
        }
    }

    if let Some(expected) = &expect.content_json_exact {
        match body_json.parsed() {
            Ok(actual) => {
                if actual != expected {
                    return CheckOutcome::Fail(format!(
                        "Expected {expected} but got {actual}"
                    ));
                }
            }
            Err(e) => {
                return CheckOutcome::Fail(format!(
                    "content-json-exact: response is not valid JSON: {e}"
                ));
            }
        }
    }

    if let Some(expected) = &expect.content_json_partial {
        match body_json.parsed() {
            Ok(actual) => {
                let Some(actual_obj) = actual.as_object() else {
                    return CheckOutcome::Fail(format!(
                        "content-json-partial: response JSON is not an \
                         object (got {actual})"
                    ));
                };
                for (key, expected_value) in expected.iter() {
                    match actual_obj.get(key) {
                        None => {
                            return CheckOutcome::Fail(format!(
                                "Key '{key}' missing from response JSON"
                            ));
                        }
                        Some(actual_value)
                            if actual_value != expected_value =>
                        {
                            return CheckOutcome::Fail(format!(
                                "Key '{key}': expected {expected_value} \
                                 but got {actual_value}"
                            ));
                        }
                        Some(_) => {}
                    }
                }
            }
            Err(e) => {
                return CheckOutcome::Fail(format!(
                    "content-json-partial: response is not valid JSON: {e}"
                ));
            }
        }
    }

    CheckOutcome::Pass
}

/// Lazily parsed response body, parsed at most once across the
/// JSON-based checks.
struct BodyJson<'a> {
    body: &'a str,
    cache: Option<Result<Value, String>>,
}

impl<'a> BodyJson<'a> {
    fn new(body: &'a str) -> Self {
        Self { body, cache: None }
    }

    fn parsed(&mut self) -> Result<&Value, String> {
        let entry = self.cache.get_or_insert_with(|| {
            serde_json::from_str(self.body).map_err(|e| e.to_string())
        });
        match entry {
            Ok(value) => Ok(value),
            Err(e) => Err(e.clone()),
        }
    }
}

/// Length of a JSON container, if the value has one.
fn json_len(value: &Value) -> Option<usize> {
    match value {
        Value::Array(array) => Some(array.len()),
        Value::Object(object) => Some(object.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    fn expect(value: serde_json::Value) -> ResponseExpectation {
        serde_json::from_value(value).unwrap()
    }

    fn fail_message(outcome: CheckOutcome) -> String {
        match outcome {
            CheckOutcome::Fail(msg) => msg,
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn absent_expectation_is_unchecked() {
        let outcome = evaluate(None, &response(500, "anything"));
        assert_eq!(outcome, CheckOutcome::Unchecked);
    }

    #[test]
    fn matching_status_code_passes() {
        let e = expect(json!({"code": 200}));
        assert_eq!(
            evaluate(Some(&e), &response(200, "")),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn status_mismatch_names_both_codes() {
        let e = expect(json!({"code": 200}));
        let msg = fail_message(evaluate(Some(&e), &response(404, "")));
        assert!(msg.contains("200"), "{msg}");
        assert!(msg.contains("404"), "{msg}");
    }

    #[test]
    fn nb_json_items_counts_array_elements() {
        let e = expect(json!({"nb_json_items": 3}));
        assert_eq!(
            evaluate(Some(&e), &response(200, "[1, 2, 3]")),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn nb_json_items_counts_object_keys() {
        let e = expect(json!({"nb_json_items": 2}));
        assert_eq!(
            evaluate(Some(&e), &response(200, r#"{"a": 1, "b": 2}"#)),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn nb_json_items_mismatch_fails() {
        let e = expect(json!({"nb_json_items": 3}));
        let msg = fail_message(evaluate(Some(&e), &response(200, "[1]")));
        assert!(msg.contains("Expected 3 json items but got 1"), "{msg}");
    }

    #[test]
    fn nb_json_items_on_invalid_json_fails_descriptively() {
        let e = expect(json!({"nb_json_items": 1}));
        let msg =
            fail_message(evaluate(Some(&e), &response(200, "not json")));
        assert!(msg.contains("not valid JSON"), "{msg}");
    }

    #[test]
    fn nb_json_items_on_scalar_fails_descriptively() {
        let e = expect(json!({"nb_json_items": 1}));
        let msg = fail_message(evaluate(Some(&e), &response(200, "42")));
        assert!(msg.contains("no length"), "{msg}");
    }

    #[test]
    fn string_exact_match_passes() {
        let e = expect(json!({"content-string-exact": "pong"}));
        assert_eq!(
            evaluate(Some(&e), &response(200, "pong")),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn string_exact_never_requires_a_json_body() {
        let e = expect(json!({
            "code": 200,
            "content-string-exact": "plain text, not json"
        }));
        assert_eq!(
            evaluate(Some(&e), &response(200, "plain text, not json")),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn json_exact_on_invalid_json_fails_descriptively() {
        let e = expect(json!({"content-json-exact": {"a": 1}}));
        let msg =
            fail_message(evaluate(Some(&e), &response(200, "not json")));
        assert!(msg.contains("content-json-exact"), "{msg}");
        assert!(msg.contains("not valid JSON"), "{msg}");
    }

    #[test]
    fn json_partial_on_invalid_json_fails_descriptively() {
        let e = expect(json!({"content-json-partial": {"status": "ok"}}));
        let msg =
            fail_message(evaluate(Some(&e), &response(200, "not json")));
        assert!(msg.contains("content-json-partial"), "{msg}");
        assert!(msg.contains("not valid JSON"), "{msg}");
    }

    #[test]
    fn string_exact_mismatch_fails() {
        let e = expect(json!({"content-string-exact": "pong"}));
        assert!(evaluate(Some(&e), &response(200, "ping")).is_fail());
    }

    #[test]
    fn json_exact_ignores_key_order() {
        let e = expect(json!({"content-json-exact": {"a": 1, "b": 2}}));
        assert_eq!(
            evaluate(Some(&e), &response(200, r#"{"b": 2, "a": 1}"#)),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn json_exact_distinguishes_string_from_number() {
        let e = expect(json!({"content-json-exact": {"n": 1}}));
        assert!(
            evaluate(Some(&e), &response(200, r#"{"n": "1"}"#)).is_fail()
        );
    }

    #[test]
    fn json_exact_array_length_mismatch_fails() {
        let e = expect(json!({"content-json-exact": [1, 2, 3]}));
        assert_eq!(
            evaluate(Some(&e), &response(200, "[1, 2, 3]")),
            CheckOutcome::Pass
        );
        assert!(evaluate(Some(&e), &response(200, "[1, 2]")).is_fail());
    }

    #[test]
    fn json_partial_ignores_unlisted_keys() {
        let e = expect(json!({"content-json-partial": {"status": "ok"}}));
        assert_eq!(
            evaluate(
                Some(&e),
                &response(200, r#"{"status": "ok", "id": 5}"#)
            ),
            CheckOutcome::Pass
        );
    }

    #[test]
    fn json_partial_missing_key_message_is_distinct() {
        let e = expect(json!({"content-json-partial": {"status": "ok"}}));
        let msg =
            fail_message(evaluate(Some(&e), &response(200, r#"{"id": 5}"#)));
        assert!(msg.contains("missing"), "{msg}");
    }

    #[test]
    fn json_partial_value_mismatch_message_is_distinct() {
        let e = expect(json!({"content-json-partial": {"status": "ok"}}));
        let msg = fail_message(evaluate(
            Some(&e),
            &response(200, r#"{"status": "down"}"#),
        ));
        assert!(msg.contains("expected"), "{msg}");
        assert!(!msg.contains("missing"), "{msg}");
    }

    #[test]
    fn json_partial_on_non_object_fails() {
        let e = expect(json!({"content-json-partial": {"status": "ok"}}));
        let msg =
            fail_message(evaluate(Some(&e), &response(200, "[1, 2]")));
        assert!(msg.contains("not an object"), "{msg}");
    }

    #[test]
    fn first_failing_check_short_circuits() {
        // Status fails first; the body is not even valid JSON but
        // the json checks must never be reached.
        let e = expect(json!({
            "code": 200,
            "content-json-exact": {"a": 1}
        }));
        let msg =
            fail_message(evaluate(Some(&e), &response(500, "not json")));
        assert!(msg.contains("Expected status 200"), "{msg}");
    }

    #[test]
    fn all_declared_checks_must_pass() {
        let e = expect(json!({
            "code": 200,
            "nb_json_items": 1,
            "content-json-partial": {"status": "ok"}
        }));
        assert_eq!(
            evaluate(Some(&e), &response(200, r#"{"status": "ok"}"#)),
            CheckOutcome::Pass
        );
    }
}
