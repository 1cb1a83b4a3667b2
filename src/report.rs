// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use owo_colors::OwoColorize;
use serde_json::Value as JsonValue;

use crate::response::AggResponse;

/// Actions that mean the request was let through. Everything else
/// counts as mitigated.
const UNMITIGATED_ACTIONS: [&str; 2] = ["allow", "report"];

/// Per-action counts and the mitigated/unmitigated split for a
/// drill-down count query.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CountSummary {
    pub total_hits: u64,
    pub actions: Vec<(String, u64)>,
    pub mitigated: u64,
    pub unmitigated: u64,
}

impl CountSummary {
    pub(crate) fn from_response(response: &AggResponse) -> Self {
        let mut summary = CountSummary {
            total_hits: response.total_hits.unwrap_or(0),
            ..Default::default()
        };
        for bucket in response.buckets() {
            let count = bucket.count.as_ref().map(|c| c.as_u64()).unwrap_or(0);
            if UNMITIGATED_ACTIONS.contains(&bucket.key.as_str()) {
                summary.unmitigated += count;
            } else {
                summary.mitigated += count;
            }
            summary.actions.push((bucket.key.clone(), count));
        }
        summary
    }
}

pub(crate) fn print_count_summary(summary: &CountSummary) {
    println!("{}", "--- FINAL COUNT SUMMARY ---".bold());
    println!("Total events found: {}", summary.total_hits);

    if summary.actions.is_empty() {
        return;
    }

    println!();
    println!("Breakdown by action:");
    for (action, count) in &summary.actions {
        println!("  - {}: {}", action.cyan(), count);
    }

    println!();
    println!("Mitigation summary:");
    println!("  - Unmitigated: {}", summary.unmitigated.yellow());
    println!("  - Mitigated: {}", summary.mitigated.green());
}

pub(crate) fn print_events(payload: &JsonValue) {
    println!("{}", "--- FINAL EVENT LOGS ---".bold());
    print_json(payload);
}

pub(crate) fn print_json(value: &JsonValue) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{pretty}"),
        Err(_) => println!("{value}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> AggResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_count_classification() {
        let response = response(json!({
            "total_hits": 10,
            "aggs": {"actions": {"field_aggregation": {"buckets": [
                {"key": "allow", "count": "5"},
                {"key": "block", "count": "3"},
                {"key": "report", "count": "2"},
            ]}}}
        }));
        let summary = CountSummary::from_response(&response);
        assert_eq!(summary.total_hits, 10);
        assert_eq!(summary.unmitigated, 7);
        assert_eq!(summary.mitigated, 3);
        assert_eq!(
            summary.actions,
            vec![
                ("allow".to_string(), 5),
                ("block".to_string(), 3),
                ("report".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_total_hits_defaults_to_zero() {
        let summary = CountSummary::from_response(&response(json!({})));
        assert_eq!(summary.total_hits, 0);
        assert!(summary.actions.is_empty());
    }

    #[test]
    fn test_unknown_actions_are_mitigated() {
        let response = response(json!({
            "aggs": {"actions": {"field_aggregation": {"buckets": [
                {"key": "custom-rule", "count": 4},
            ]}}}
        }));
        let summary = CountSummary::from_response(&response);
        assert_eq!(summary.mitigated, 4);
        assert_eq!(summary.unmitigated, 0);
    }
}
