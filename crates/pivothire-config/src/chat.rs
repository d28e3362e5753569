use serde::Deserialize;

/// Chat relay configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Route the relay is mounted on
    #[serde(default = "default_path")]
    pub path: String,
    /// Number of most recent client messages forwarded upstream
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Reject turns from requests without an identified user
    #[serde(default)]
    pub require_user: bool,
    /// Replaces the built-in assistant instructions
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Skills the assistant may reference by id
    #[serde(default)]
    pub skills: Vec<SkillConfig>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_history: default_max_history(),
            require_user: false,
            system_prompt: None,
            skills: Vec::new(),
        }
    }
}

/// One entry of the skills catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillConfig {
    /// Identifier the model must use in `skillsRequired`
    pub id: u32,
    /// Display name shown to the user
    pub name: String,
    /// Optional grouping
    #[serde(default)]
    pub category: Option<String>,
}

fn default_path() -> String {
    "/api/chat".to_owned()
}

const fn default_max_history() -> usize {
    50
}
