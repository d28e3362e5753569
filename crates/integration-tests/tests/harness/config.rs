//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use pivothire_config::{
    ChatConfig, Config, CorsConfig, HealthConfig, IdentityConfig, LlmConfig, ServerConfig, SkillConfig,
};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal configuration with no upstream key
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    ..ServerConfig::default()
                },
                llm: LlmConfig::default(),
                chat: ChatConfig::default(),
                telemetry: None,
            },
        }
    }

    /// Point the relay at a mock completion API with a test key
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.llm.api_key = Some(SecretString::from("test-key"));
        self.config.llm.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Point the relay at a mock completion API without any key
    pub fn with_keyless_upstream(mut self, base_url: &str) -> Self {
        self.config.llm.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Add a skill to the catalog
    pub fn with_skill(mut self, id: u32, name: &str) -> Self {
        self.config.chat.skills.push(SkillConfig {
            id,
            name: name.to_owned(),
            category: None,
        });
        self
    }

    /// Bound the forwarded history
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.config.chat.max_history = max_history;
        self
    }

    /// Require the identity header on chat turns
    pub fn requiring_user(mut self) -> Self {
        self.config.server.identity = Some(IdentityConfig::default());
        self.config.chat.require_user = true;
        self
    }

    /// Require the user id in a custom header
    pub fn requiring_user_header(mut self, header: &str) -> Self {
        self.config.server.identity = Some(IdentityConfig {
            header: header.to_owned(),
        });
        self.config.chat.require_user = true;
        self
    }

    /// Mount the chat relay at another path
    pub fn with_chat_path(mut self, path: &str) -> Self {
        path.clone_into(&mut self.config.chat.path);
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
