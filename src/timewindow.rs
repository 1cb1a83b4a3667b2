// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, SecondsFormat, Utc};

use crate::prelude::*;

const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// A resolved query time window. Both ends are RFC 3339 strings; the
/// rest of the pipeline treats them as opaque template values.
#[derive(Debug, Clone)]
pub(crate) struct TimeWindow {
    pub start_time: String,
    pub end_time: String,
}

impl TimeWindow {
    /// A window ending now, starting `duration` ago. Accepts humanized
    /// durations such as "5m", "1h", "3d".
    pub(crate) fn relative(duration: &str) -> Result<Self> {
        let duration = humantime::parse_duration(duration)
            .map_err(|err| anyhow::anyhow!("invalid relative time \"{duration}\": {err}"))?;
        let now = Utc::now();
        let start = now - chrono::Duration::from_std(duration)?;
        Ok(Self {
            start_time: format_timestamp(start),
            end_time: format_timestamp(now),
        })
    }

    /// An exact window. Passed through untouched; the API does its own
    /// timestamp validation.
    pub(crate) fn absolute(start_time: &str, end_time: &str) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    /// The default window: the last 15 minutes.
    pub(crate) fn last_15_minutes() -> Self {
        let now = Utc::now();
        let start = now - chrono::Duration::minutes(DEFAULT_WINDOW_MINUTES);
        Self {
            start_time: format_timestamp(start),
            end_time: format_timestamp(now),
        }
    }
}

/// RFC 3339, UTC, millisecond precision with a Z timezone.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
