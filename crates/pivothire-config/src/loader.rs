use std::collections::HashSet;
use std::path::Path;

use crate::{AllowList, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// expanded, the TOML is invalid, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder cannot be expanded, the TOML is
    /// invalid, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_chat()?;
        self.validate_llm()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        if let Some(cors) = &self.server.cors
            && cors.credentials
            && [&cors.origins, &cors.methods, &cors.headers].contains(&&AllowList::Any)
        {
            anyhow::bail!("server.cors.credentials cannot be combined with \"*\" origins, methods, or headers");
        }

        if let Some(identity) = &self.server.identity
            && !is_header_name(&identity.header)
        {
            anyhow::bail!("server.identity.header {:?} is not a valid header name", identity.header);
        }

        Ok(())
    }

    fn validate_chat(&self) -> anyhow::Result<()> {
        if self.chat.max_history == 0 {
            anyhow::bail!("chat.max_history must be greater than 0");
        }

        if !self.chat.path.starts_with('/') {
            anyhow::bail!("chat.path must start with '/'");
        }

        let mut seen = HashSet::new();
        for skill in &self.chat.skills {
            if skill.name.trim().is_empty() {
                anyhow::bail!("skill {} has an empty name", skill.id);
            }
            if !seen.insert(skill.id) {
                anyhow::bail!("duplicate skill id {}", skill.id);
            }
        }

        Ok(())
    }

    fn validate_llm(&self) -> anyhow::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be between 0 and 2");
        }

        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must not be empty");
        }

        Ok(())
    }
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}
