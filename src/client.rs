// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use serde_json::Value as JsonValue;

use crate::config::{Auth, Config};
use crate::prelude::*;

/// Thin wrapper over reqwest that knows how to authenticate against
/// the events API.
#[derive(Debug, Clone)]
pub(crate) struct Client {
    auth: Auth,
}

impl Client {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            auth: config.auth.clone(),
        }
    }

    fn get_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().build()
    }

    fn request(&self, url: &str) -> Result<reqwest::RequestBuilder, reqwest::Error> {
        let request = self
            .get_http_client()?
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");
        let request = match &self.auth {
            Auth::ApiToken { token } => {
                request.header("Authorization", format!("APIToken {token}"))
            }
            Auth::Csrf { cookie, origin } => {
                request.header("Cookie", cookie).header("Origin", origin)
            }
        };
        Ok(request)
    }

    /// POST a request body, returning the parsed JSON response. A
    /// non-success status becomes a transport error carrying the
    /// response payload when one could be read.
    pub(crate) async fn post(&self, url: &str, body: &JsonValue) -> Result<JsonValue, AppError> {
        debug!("POST {}: {}", url, body);
        let response = self.request(url)?.json(body).send().await.map_err(|err| {
            AppError::Transport {
                url: url.to_string(),
                message: err.to_string(),
                response: None,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let payload: Option<JsonValue> = response.json().await.ok();
            return Err(AppError::Transport {
                url: url.to_string(),
                message: format!("status {status}"),
                response: payload,
            });
        }

        let payload: JsonValue = response.json().await.map_err(|err| AppError::Transport {
            url: url.to_string(),
            message: err.to_string(),
            response: None,
        })?;
        trace!("Response from {}: {}", url, payload);
        Ok(payload)
    }
}
