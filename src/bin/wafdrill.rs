// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use tracing::error;
use wafdrill::error::AppError;

#[tokio::main]
async fn main() {
    if let Err(err) = wafdrill::cli::main().await {
        // An API error response is more useful than our own message,
        // so print it verbatim when the transport captured one.
        if let Some(AppError::Transport {
            response: Some(payload),
            ..
        }) = err.downcast_ref::<AppError>()
        {
            error!("{}", err);
            eprintln!(
                "{}",
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
            );
        } else {
            error!("{}", err);
        }
        std::process::exit(1);
    }
}
