// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("could not read configuration file: {0}")]
    ConfigRead(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// A field required by the selected auth method, or for URL
    /// assembly, is absent from the configuration file.
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("could not read query file: {0}")]
    QueryFileRead(String),

    #[error("failed to parse query template {path}: {reason}")]
    TemplateParse { path: String, reason: String },

    /// Caller contract violation: the template's `query` is not a
    /// mapping of field name to raw value string.
    #[error("malformed filter input: {0}")]
    MalformedFilter(String),

    /// The response payload, if one could be read, is carried for
    /// diagnostics and printed verbatim by the top level.
    #[error("request to {url} failed: {message}")]
    Transport {
        url: String,
        message: String,
        response: Option<JsonValue>,
    },

    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("serde: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}
