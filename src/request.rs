// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::template::{self, SubstitutionContext};

/// Read a query template file. The error names the resolved path so a
/// bad relative path can be diagnosed without re-running.
pub(crate) fn read_query_template(path: &str) -> Result<String, AppError> {
    let resolved = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
    std::fs::read_to_string(&resolved)
        .map_err(|_| AppError::QueryFileRead(resolved.display().to_string()))
}

/// Parse a populated template into a JSON value.
pub(crate) fn parse_template(path: &str, populated: &str) -> Result<JsonValue, AppError> {
    serde_json::from_str(populated).map_err(|err| AppError::TemplateParse {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

/// Turn a parsed template object into a request body: the `query`
/// mapping is serialized into a single filter expression string, all
/// other fields pass through unchanged.
///
/// Values are not quote-escaped. A value containing `"` produces a
/// malformed expression, not an error.
pub(crate) fn build_request_body(mut template: JsonValue) -> Result<JsonValue, AppError> {
    let query = match template.get("query") {
        Some(JsonValue::Object(query)) => query,
        _ => {
            return Err(AppError::MalformedFilter(
                "\"query\" is not an object".to_string(),
            ))
        }
    };

    let mut clauses = Vec::with_capacity(query.len());
    for (field, value) in query {
        let value = value.as_str().ok_or_else(|| {
            AppError::MalformedFilter(format!("value for field \"{field}\" is not a string"))
        })?;
        let (operator, value) = infer_operator(value);
        clauses.push(format!("{field}{operator}\"{value}\""));
    }

    template["query"] = JsonValue::String(format!("{{{}}}", clauses.join(",")));
    Ok(template)
}

/// Prepare a request body from a template file: read, populate, parse,
/// build.
pub(crate) fn prepare_request_body(
    path: &str,
    context: &SubstitutionContext,
) -> Result<JsonValue, AppError> {
    let raw = read_query_template(path)?;
    let populated = template::populate(&raw, context);
    let parsed = parse_template(path, &populated)?;
    build_request_body(parsed)
}

/// Infer the comparison operator for a raw filter value. Explicit
/// prefixes win and are stripped, checked longest first since they
/// overlap. A bare value containing `|` is treated as a regex
/// alternation and kept as-is.
fn infer_operator(value: &str) -> (&'static str, &str) {
    if let Some(rest) = value.strip_prefix("!=") {
        ("!=", rest)
    } else if let Some(rest) = value.strip_prefix("!~") {
        ("!~", rest)
    } else if let Some(rest) = value.strip_prefix("=~") {
        ("=~", rest)
    } else if let Some(rest) = value.strip_prefix('=') {
        ("=", rest)
    } else if value.contains('|') {
        ("=~", value)
    } else {
        ("=", value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn built_query(template: JsonValue) -> String {
        let body = build_request_body(template).unwrap();
        body["query"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(built_query(json!({"query": {"f": "!=x"}})), r#"{f!="x"}"#);
        assert_eq!(built_query(json!({"query": {"f": "!~x"}})), r#"{f!~"x"}"#);
        assert_eq!(built_query(json!({"query": {"f": "=~x"}})), r#"{f=~"x"}"#);
        assert_eq!(built_query(json!({"query": {"f": "=x"}})), r#"{f="x"}"#);
        assert_eq!(built_query(json!({"query": {"f": "a|b"}})), r#"{f=~"a|b"}"#);
        assert_eq!(
            built_query(json!({"query": {"f": "plain"}})),
            r#"{f="plain"}"#
        );
    }

    #[test]
    fn test_multi_field_ordering() {
        // Insertion order of the template object is preserved.
        assert_eq!(
            built_query(json!({"query": {"A": "1", "B": "2"}})),
            r#"{A="1",B="2"}"#
        );
        assert_eq!(
            built_query(json!({"query": {"B": "2", "A": "1"}})),
            r#"{B="2",A="1"}"#
        );
    }

    #[test]
    fn test_passthrough_fields() {
        let template = json!({
            "query": {"src_ip": "1.2.3.4"},
            "aggs": {"actions": {"field_aggregation": {"field": "action"}}},
            "limit": 50,
        });
        let body = build_request_body(template).unwrap();
        assert_eq!(body["query"], json!(r#"{src_ip="1.2.3.4"}"#));
        assert_eq!(
            body["aggs"],
            json!({"actions": {"field_aggregation": {"field": "action"}}})
        );
        assert_eq!(body["limit"], json!(50));
    }

    #[test]
    fn test_non_string_value_is_an_error() {
        let err = build_request_body(json!({"query": {"f": 1}})).unwrap_err();
        assert!(matches!(err, AppError::MalformedFilter(_)));
    }

    #[test]
    fn test_already_built_query_is_an_error() {
        // A body whose query is already a filter expression string must
        // not be fed back through the builder.
        let err = build_request_body(json!({"query": r#"{f="x"}"#})).unwrap_err();
        assert!(matches!(err, AppError::MalformedFilter(_)));
    }

    #[test]
    fn test_missing_query_is_an_error() {
        let err = build_request_body(json!({"aggs": {}})).unwrap_err();
        assert!(matches!(err, AppError::MalformedFilter(_)));
    }
}
