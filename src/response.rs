// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::Deserialize;

/// Aggregation response as returned by the events API. Every level of
/// the `aggs` tree may be absent; absence anywhere means "no buckets",
/// never an error.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AggResponse {
    pub total_hits: Option<u64>,
    pub aggs: Option<IndexMap<String, AggGroup>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggGroup {
    pub field_aggregation: Option<FieldAggregation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldAggregation {
    pub buckets: Option<Vec<Bucket>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Bucket {
    pub key: String,
    pub count: Option<BucketCount>,
}

/// Bucket counts come back as strings from some API versions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BucketCount {
    Number(u64),
    String(String),
}

impl BucketCount {
    pub(crate) fn as_u64(&self) -> u64 {
        match self {
            BucketCount::Number(n) => *n,
            BucketCount::String(s) => s.parse().unwrap_or(0),
        }
    }
}

impl AggResponse {
    /// The first aggregation group in document order. Responses with
    /// more than one group only ever have the first consulted.
    fn first_agg(&self) -> Option<&AggGroup> {
        self.aggs.as_ref().and_then(|aggs| aggs.values().next())
    }

    pub(crate) fn buckets(&self) -> &[Bucket] {
        self.first_agg()
            .and_then(|agg| agg.field_aggregation.as_ref())
            .and_then(|fa| fa.buckets.as_deref())
            .unwrap_or(&[])
    }
}

/// The distinct grouped values ("bucket" keys) of the first
/// aggregation, in response order.
pub(crate) fn extract_bucket_keys(response: &AggResponse) -> Vec<String> {
    response
        .buckets()
        .iter()
        .map(|bucket| bucket.key.clone())
        .collect()
}
