// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use serde_json::Value as JsonValue;

use crate::client::Client;
use crate::config::Config;
use crate::exempt;
use crate::prelude::*;
use crate::report::CountSummary;
use crate::request;
use crate::response::{self, AggResponse};
use crate::template;
use crate::timewindow::TimeWindow;

/// Run one templated query against the aggregation endpoint and return
/// the raw response for the caller to report.
pub(crate) async fn single_query(
    config: &Config,
    query_file: &str,
    window: &TimeWindow,
) -> Result<JsonValue, AppError> {
    info!("Running query from: {}", query_file);
    let context = config.substitution_context(window);
    let body = request::prepare_request_body(query_file, &context)?;
    let client = Client::new(config);
    client.post(&config.aggregation_url, &body).await
}

/// Which endpoint a drill-down step 2 body is for. A body carrying at
/// least one aggregation is a count query, anything else lists events.
/// The step 2 template's author controls the mode by including or
/// omitting an `aggs` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueryMode {
    Count,
    Events,
}

impl QueryMode {
    pub(crate) fn from_body(body: &JsonValue) -> Self {
        match body.get("aggs") {
            Some(JsonValue::Object(aggs)) if !aggs.is_empty() => QueryMode::Count,
            _ => QueryMode::Events,
        }
    }
}

/// Terminal result of a drill-down run.
#[derive(Debug)]
pub(crate) enum DrillDownOutcome {
    /// Step 1 produced no values to drill into. A normal end state,
    /// not a failure.
    NothingToDrill,
    Count(CountSummary),
    Events(JsonValue),
}

/// The drill-down states. The run always moves forward; there are no
/// retries and the first error aborts the whole run.
enum State {
    RunStep1,
    Extract(AggResponse),
    FilterExempt(Vec<String>),
    CheckEmpty(Vec<String>),
    Truncate(Vec<String>),
    BuildStep2(Vec<String>),
    Dispatch(JsonValue),
}

/// Result of a non-dispatching state transition.
enum Transition {
    Next(State),
    Done(DrillDownOutcome),
}

/// Two-step drill-down: the top bucket values from the first query
/// become filter values for the second.
pub(crate) struct DrillDown<'a> {
    config: &'a Config,
    client: Client,
    step1_file: &'a str,
    step2_file: &'a str,
    field: &'a str,
    window: &'a TimeWindow,
}

impl<'a> DrillDown<'a> {
    pub(crate) fn new(
        config: &'a Config,
        step1_file: &'a str,
        step2_file: &'a str,
        field: &'a str,
        window: &'a TimeWindow,
    ) -> Self {
        Self {
            config,
            client: Client::new(config),
            step1_file,
            step2_file,
            field,
            window,
        }
    }

    /// Drive the state machine to a terminal state. Step 2 never
    /// starts before step 1's response is fully consumed, as its body
    /// depends on the extracted values.
    pub(crate) async fn run(&self) -> Result<DrillDownOutcome, AppError> {
        let mut state = State::RunStep1;
        loop {
            state = match state {
                State::RunStep1 => {
                    info!(
                        "STEP 1: Getting top values for '{}' using '{}'",
                        self.field, self.step1_file
                    );
                    let context = self.config.substitution_context(self.window);
                    let body = request::prepare_request_body(self.step1_file, &context)?;
                    let response = self.client.post(&self.config.aggregation_url, &body).await?;
                    State::Extract(serde_json::from_value(response)?)
                }
                State::Dispatch(body) => match QueryMode::from_body(&body) {
                    QueryMode::Count => {
                        let response =
                            self.client.post(&self.config.aggregation_url, &body).await?;
                        let response: AggResponse = serde_json::from_value(response)?;
                        return Ok(DrillDownOutcome::Count(CountSummary::from_response(
                            &response,
                        )));
                    }
                    QueryMode::Events => {
                        let response = self.client.post(&self.config.events_url, &body).await?;
                        return Ok(DrillDownOutcome::Events(response));
                    }
                },
                state => match self.advance(state)? {
                    Transition::Next(next) => next,
                    Transition::Done(outcome) => return Ok(outcome),
                },
            };
        }
    }

    /// The pure transitions between step 1's response and the step 2
    /// dispatch.
    fn advance(&self, state: State) -> Result<Transition, AppError> {
        let next = match state {
            State::Extract(response) => {
                State::FilterExempt(response::extract_bucket_keys(&response))
            }
            State::FilterExempt(values) => State::CheckEmpty(exempt::filter_exempt(
                values,
                &self.config.exempt_subnets,
            )),
            State::CheckEmpty(values) => {
                if values.is_empty() {
                    info!("No non-exempt values found to drill down on, exiting");
                    return Ok(Transition::Done(DrillDownOutcome::NothingToDrill));
                }
                info!("Found {} total non-exempt values", values.len());
                State::Truncate(values)
            }
            State::Truncate(values) => {
                let values = truncate_values(values, self.config.max_drilldown_values);
                info!("Using values: {}", values.join(", "));
                State::BuildStep2(values)
            }
            State::BuildStep2(values) => {
                info!(
                    "STEP 2: Getting details for these values using '{}'",
                    self.step2_file
                );
                let raw = request::read_query_template(self.step2_file)?;
                let context = self.config.substitution_context(self.window);
                let populated = template::populate_drilldown(&raw, &context, &values);
                let parsed = request::parse_template(self.step2_file, &populated)?;
                State::Dispatch(request::build_request_body(parsed)?)
            }
            // Network states are handled by run().
            State::RunStep1 | State::Dispatch(_) => unreachable!(),
        };
        Ok(Transition::Next(next))
    }
}

/// Keep the leading (highest ranked) values, up to `max`.
fn truncate_values(mut values: Vec<String>, max: usize) -> Vec<String> {
    if values.len() > max {
        info!(
            "Limiting to the top {} values for the drill-down query, dropping {}",
            max,
            values.len() - max
        );
        values.truncate(max);
    }
    values
}
