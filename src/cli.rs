// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use clap::Parser;

use crate::config::Config;
use crate::logger;
use crate::prelude::*;
use crate::report;
use crate::timewindow::TimeWindow;
use crate::workflow::{self, DrillDown, DrillDownOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "wafdrill",
    version,
    about = "Templated filter queries and drill-downs for WAF security event APIs"
)]
pub(crate) struct Args {
    /// Query template file.
    #[arg(value_name = "QUERY_FILE")]
    query_file: String,

    /// Increase verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file.
    #[arg(
        short,
        long,
        default_value = "config.json",
        env = "WAFDRILL_CONFIG",
        hide_env = true
    )]
    config: String,

    /// Relative time window ending now (examples: 5m, 1h, 3d).
    #[arg(long, value_name = "DURATION", conflicts_with = "absolute")]
    relative: Option<String>,

    /// Exact ISO 8601 time window.
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    absolute: Option<Vec<String>>,

    /// Two-step analysis: the field extracted from the first query and
    /// the query file its top values are drilled into.
    #[arg(long, num_args = 2, value_names = ["FIELD", "QUERY_FILE"])]
    drill_down: Option<Vec<String>>,
}

pub async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose > 1 {
        tracing::Level::TRACE
    } else if args.verbose > 0 {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    logger::init_logger(log_level);

    let config = Config::load(&args.config)?;
    let window = time_window(&args)?;

    match &args.drill_down {
        Some(drill_down) => {
            let field = &drill_down[0];
            let step2_file = &drill_down[1];
            let drilldown = DrillDown::new(&config, &args.query_file, step2_file, field, &window);
            match drilldown.run().await? {
                DrillDownOutcome::NothingToDrill => {}
                DrillDownOutcome::Count(summary) => report::print_count_summary(&summary),
                DrillDownOutcome::Events(payload) => report::print_events(&payload),
            }
        }
        None => {
            let response = workflow::single_query(&config, &args.query_file, &window).await?;
            report::print_json(&response);
        }
    }

    Ok(())
}

fn time_window(args: &Args) -> Result<TimeWindow> {
    if let Some(relative) = &args.relative {
        TimeWindow::relative(relative)
    } else if let Some(absolute) = &args.absolute {
        Ok(TimeWindow::absolute(&absolute[0], &absolute[1]))
    } else {
        Ok(TimeWindow::last_15_minutes())
    }
}
