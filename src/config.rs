// SPDX-FileCopyrightText: (C) 2025 Kayvan <kayvan@noris.io>
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::template::SubstitutionContext;
use crate::timewindow::TimeWindow;

pub(crate) const DEFAULT_MAX_DRILLDOWN_VALUES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub(crate) enum AuthMethod {
    #[default]
    #[serde(rename = "API_TOKEN")]
    ApiToken,
    #[serde(rename = "CSRF")]
    Csrf,
}

/// Authentication material, resolved and validated at load time.
#[derive(Debug, Clone)]
pub(crate) enum Auth {
    ApiToken { token: String },
    Csrf { cookie: String, origin: String },
}

/// The raw configuration document, as found in the file. Field names
/// follow the file's SCREAMING_SNAKE_CASE convention.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
struct ConfigFile {
    tenant_url: Option<String>,
    namespace: Option<String>,
    api_aggregation_url_template: Option<String>,
    api_events_url_template: Option<String>,
    auth_method: AuthMethod,
    api_token: Option<String>,
    csrf_token: Option<String>,
    cookie_string: Option<String>,
    lb_name: Option<String>,
    vh_name_template: Option<String>,
    exempt_subnets: Vec<String>,
    max_drilldown_values: Option<usize>,
}

/// Immutable runtime configuration, passed by reference into whatever
/// needs it.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub aggregation_url: String,
    pub events_url: String,
    pub exempt_subnets: Vec<String>,
    pub max_drilldown_values: usize,
    pub auth: Auth,
    substitutions: SubstitutionContext,
}

impl Config {
    pub(crate) fn load(path: &str) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| AppError::ConfigRead(format!("{path}: {err}")))?;
        Self::parse(&content)
    }

    pub(crate) fn parse(content: &str) -> Result<Self, AppError> {
        let stripped = strip_comment_lines(content);
        let raw: JsonValue = serde_json::from_str(&stripped)
            .map_err(|err| AppError::ConfigParse(err.to_string()))?;
        let file: ConfigFile = serde_json::from_value(raw.clone())
            .map_err(|err| AppError::ConfigParse(err.to_string()))?;
        Self::build(file, &raw)
    }

    fn build(file: ConfigFile, raw: &JsonValue) -> Result<Self, AppError> {
        let tenant_url = file.tenant_url.ok_or(AppError::MissingConfig("TENANT_URL"))?;
        let namespace = file.namespace.ok_or(AppError::MissingConfig("NAMESPACE"))?;
        let agg_template = file
            .api_aggregation_url_template
            .ok_or(AppError::MissingConfig("API_AGGREGATION_URL_TEMPLATE"))?;
        let events_template = file
            .api_events_url_template
            .ok_or(AppError::MissingConfig("API_EVENTS_URL_TEMPLATE"))?;

        let mut aggregation_url = expand_url(&agg_template, &tenant_url, &namespace);
        let mut events_url = expand_url(&events_template, &tenant_url, &namespace);

        let auth = match file.auth_method {
            AuthMethod::Csrf => {
                let csrf_token = file.csrf_token.ok_or(AppError::MissingConfig("CSRF_TOKEN"))?;
                let cookie = file
                    .cookie_string
                    .ok_or(AppError::MissingConfig("COOKIE_STRING"))?;
                aggregation_url = format!("{aggregation_url}?csrf={csrf_token}");
                events_url = format!("{events_url}?csrf={csrf_token}");
                Auth::Csrf {
                    cookie,
                    origin: format!("https://{tenant_url}"),
                }
            }
            AuthMethod::ApiToken => {
                let token = file.api_token.ok_or(AppError::MissingConfig("API_TOKEN"))?;
                Auth::ApiToken { token }
            }
        };

        let mut substitutions = scalar_substitutions(raw);
        if let (Some(template), Some(lb_name)) = (&file.vh_name_template, &file.lb_name) {
            substitutions.insert("VH_NAME".to_string(), template.replace("${LB_NAME}", lb_name));
        }

        Ok(Config {
            aggregation_url,
            events_url,
            exempt_subnets: file.exempt_subnets,
            max_drilldown_values: file
                .max_drilldown_values
                .unwrap_or(DEFAULT_MAX_DRILLDOWN_VALUES),
            auth,
            substitutions,
        })
    }

    /// Substitution context for a query template: every scalar
    /// configuration value plus the time window.
    pub(crate) fn substitution_context(&self, window: &TimeWindow) -> SubstitutionContext {
        let mut context = self.substitutions.clone();
        context.insert("START_TIME".to_string(), window.start_time.clone());
        context.insert("END_TIME".to_string(), window.end_time.clone());
        context
    }
}

fn expand_url(template: &str, tenant_url: &str, namespace: &str) -> String {
    template
        .replace("{TENANT_URL}", tenant_url)
        .replace("{NAMESPACE}", namespace)
}

/// Drop the file's comment convention: lines whose first token is a
/// key starting with `_` or `//`.
fn strip_comment_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("\"_") && !trimmed.starts_with("\"//")
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Every scalar entry of the raw document, stringified, for use as
/// template substitutions.
fn scalar_substitutions(raw: &JsonValue) -> SubstitutionContext {
    let mut substitutions = SubstitutionContext::new();
    if let Some(map) = raw.as_object() {
        for (key, value) in map {
            match value {
                JsonValue::String(s) => {
                    substitutions.insert(key.clone(), s.clone());
                }
                JsonValue::Number(n) => {
                    substitutions.insert(key.clone(), n.to_string());
                }
                JsonValue::Bool(b) => {
                    substitutions.insert(key.clone(), b.to_string());
                }
                _ => {}
            }
        }
    }
    substitutions
}

#[cfg(test)]
mod test {
    use super::*;

    const TEST_CONFIG: &str = r#"
{
  "_comment": "test configuration",
  "TENANT_URL": "example.console.test.io",
  "NAMESPACE": "production",
  "API_AGGREGATION_URL_TEMPLATE": "https://{TENANT_URL}/api/data/namespaces/{NAMESPACE}/events/aggregation",
  "API_EVENTS_URL_TEMPLATE": "https://{TENANT_URL}/api/data/namespaces/{NAMESPACE}/events",
  "LB_NAME": "my-lb",
  "VH_NAME_TEMPLATE": "ves-io-http-loadbalancer-${LB_NAME}",
  "AUTH_METHOD": "API_TOKEN",
  "API_TOKEN": "secret",
  "EXEMPT_SUBNETS": ["10.0.0.0/8"],
  "MAX_DRILLDOWN_VALUES": 5
}
"#;

    #[test]
    fn test_parse() {
        let config = Config::parse(TEST_CONFIG).unwrap();
        assert_eq!(
            config.aggregation_url,
            "https://example.console.test.io/api/data/namespaces/production/events/aggregation"
        );
        assert_eq!(
            config.events_url,
            "https://example.console.test.io/api/data/namespaces/production/events"
        );
        assert_eq!(config.exempt_subnets, vec!["10.0.0.0/8"]);
        assert_eq!(config.max_drilldown_values, 5);
        assert!(matches!(config.auth, Auth::ApiToken { ref token } if token == "secret"));
    }

    #[test]
    fn test_substitution_context() {
        let config = Config::parse(TEST_CONFIG).unwrap();
        let window = TimeWindow::absolute("t0", "t1");
        let context = config.substitution_context(&window);
        assert_eq!(context["TENANT_URL"], "example.console.test.io");
        assert_eq!(context["VH_NAME"], "ves-io-http-loadbalancer-my-lb");
        assert_eq!(context["MAX_DRILLDOWN_VALUES"], "5");
        assert_eq!(context["START_TIME"], "t0");
        assert_eq!(context["END_TIME"], "t1");
    }

    #[test]
    fn test_csrf_auth() {
        let content = TEST_CONFIG
            .replace(r#""AUTH_METHOD": "API_TOKEN""#, r#""AUTH_METHOD": "CSRF""#)
            .replace(
                r#""API_TOKEN": "secret""#,
                r#""CSRF_TOKEN": "tok", "COOKIE_STRING": "session=abc""#,
            );
        let config = Config::parse(&content).unwrap();
        assert!(config.aggregation_url.ends_with("?csrf=tok"));
        assert!(config.events_url.ends_with("?csrf=tok"));
        match config.auth {
            Auth::Csrf { cookie, origin } => {
                assert_eq!(cookie, "session=abc");
                assert_eq!(origin, "https://example.console.test.io");
            }
            _ => panic!("expected CSRF auth"),
        }
    }

    #[test]
    fn test_missing_auth_material() {
        let content = TEST_CONFIG.replace(r#""API_TOKEN": "secret","#, "");
        let err = Config::parse(&content).unwrap_err();
        assert!(matches!(err, AppError::MissingConfig("API_TOKEN")));

        let content = TEST_CONFIG
            .replace(r#""AUTH_METHOD": "API_TOKEN""#, r#""AUTH_METHOD": "CSRF""#);
        let err = Config::parse(&content).unwrap_err();
        assert!(matches!(err, AppError::MissingConfig("CSRF_TOKEN")));
    }

    #[test]
    fn test_missing_url_field() {
        let content = TEST_CONFIG.replace(r#""NAMESPACE": "production","#, "");
        let err = Config::parse(&content).unwrap_err();
        assert!(matches!(err, AppError::MissingConfig("NAMESPACE")));
    }

    #[test]
    fn test_default_max_drilldown_values() {
        let content = TEST_CONFIG
            .replace(
                r#""EXEMPT_SUBNETS": ["10.0.0.0/8"],"#,
                r#""EXEMPT_SUBNETS": ["10.0.0.0/8"]"#,
            )
            .replace(r#""MAX_DRILLDOWN_VALUES": 5"#, "");
        let config = Config::parse(&content).unwrap();
        assert_eq!(config.max_drilldown_values, DEFAULT_MAX_DRILLDOWN_VALUES);
    }

    #[test]
    fn test_comment_lines_stripped() {
        // Comment entries are removed before parsing, so they never
        // show up as substitutions.
        let config = Config::parse(TEST_CONFIG).unwrap();
        let window = TimeWindow::absolute("t0", "t1");
        assert!(!config.substitution_context(&window).contains_key("_comment"));
    }
}
