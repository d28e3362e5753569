use std::time::Duration;

use serde::Deserialize;

/// Cross-origin policy for browser clients of the chat relay
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins
    #[serde(default)]
    pub origins: AllowList,
    /// Allowed HTTP methods
    #[serde(default)]
    pub methods: AllowList,
    /// Allowed request headers
    #[serde(default)]
    pub headers: AllowList,
    /// Allow cookies and credentials
    #[serde(default)]
    pub credentials: bool,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    /// Preflight cache lifetime
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// `"*"` or an explicit set of values
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAllowList")]
pub enum AllowList {
    /// Anything is allowed
    #[default]
    Any,
    /// Only these values
    Only(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAllowList {
    One(String),
    Many(Vec<String>),
}

impl From<RawAllowList> for AllowList {
    fn from(raw: RawAllowList) -> Self {
        let values = match raw {
            RawAllowList::One(value) => vec![value],
            RawAllowList::Many(values) => values,
        };

        if values.iter().any(|v| v == "*") {
            Self::Any
        } else {
            Self::Only(values)
        }
    }
}
