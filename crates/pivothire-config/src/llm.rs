use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Upstream chat-completion API configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Bearer credential for the completion API
    ///
    /// Optional so the service can start without it; chat turns are
    /// refused with a configuration error until it is set.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (defaults to the public `OpenAI` API)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upper bound on generated tokens per turn
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_completion_tokens: default_max_completion_tokens(),
        }
    }
}

impl LlmConfig {
    /// The API key, treating an empty string as absent
    ///
    /// `{{ env.OPENAI_API_KEY | default("") }}` expands to an empty value
    /// when the variable is unset.
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| !key.expose_secret().trim().is_empty())
    }
}

fn default_model() -> String {
    "gpt-4.1-mini".to_owned()
}

const fn default_temperature() -> f64 {
    0.5
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_completion_tokens() -> Option<u32> {
    Some(500)
}
