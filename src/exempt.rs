// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::prelude::*;

/// Drop values that fall inside any exempt network range.
///
/// Exemption only makes sense for address data: unless every value
/// parses as an IPv4 address the filter is skipped and the input
/// returned unchanged, so drill-downs on fields like user agents are
/// never mangled. The skip is logged at warn, distinguishable from the
/// nothing-configured case which logs at debug.
pub(crate) fn filter_exempt(values: Vec<String>, exempt_ranges: &[String]) -> Vec<String> {
    if !values.iter().all(|v| v.parse::<Ipv4Addr>().is_ok()) {
        warn!("Extracted values are not IP addresses, skipping exemption filter");
        return values;
    }

    if exempt_ranges.is_empty() {
        debug!("No exempt subnets configured");
        return values;
    }

    let subnets: Vec<Ipv4Network> = exempt_ranges
        .iter()
        .filter_map(|range| match range.parse::<Ipv4Network>() {
            Ok(subnet) => Some(subnet),
            Err(err) => {
                debug!("Dropping malformed exempt subnet {range}: {err}");
                None
            }
        })
        .collect();

    let before = values.len();
    let filtered: Vec<String> = values
        .into_iter()
        .filter(|value| {
            // The guard above already validated every value.
            let addr: Ipv4Addr = value.parse().unwrap();
            !subnets.iter().any(|subnet| subnet.contains(addr))
        })
        .collect();

    let removed = before - filtered.len();
    if removed > 0 {
        info!("Filtered out {} exempt IP(s)", removed);
    }
    filtered
}
