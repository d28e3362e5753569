use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::request::ToolDefinition;

/// Name of the function the assistant calls once requirements are gathered
pub const SUBMIT_PROJECT_REQUIREMENTS: &str = "submitProjectRequirements";

/// Structured project brief produced by a completed function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequirements {
    /// Project title
    pub project_name: String,
    /// What the project should achieve
    pub project_description: String,
    /// Skill ids from the configured catalog
    #[serde(default)]
    pub skills_required: Vec<u32>,
    /// Budget or budget range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    /// Deadline or duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    /// Anything else worth knowing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Reason a project brief cannot be published
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementsError {
    /// Blank project name
    #[error("Project name is required")]
    MissingName,
    /// Blank project description
    #[error("Project description is required")]
    MissingDescription,
    /// Empty skill list
    #[error("At least one skill is required.")]
    NoSkills,
}

impl ProjectRequirements {
    /// Decode the arguments of a `submitProjectRequirements` call
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not match the declared schema
    pub fn from_arguments(arguments: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(arguments)
    }

    /// Check the fields project creation insists on
    ///
    /// # Errors
    ///
    /// Returns the first missing field
    pub fn validate(&self) -> Result<(), RequirementsError> {
        if self.project_name.trim().is_empty() {
            return Err(RequirementsError::MissingName);
        }
        if self.project_description.trim().is_empty() {
            return Err(RequirementsError::MissingDescription);
        }
        if self.skills_required.is_empty() {
            return Err(RequirementsError::NoSkills);
        }
        Ok(())
    }
}

/// Function declaration describing [`ProjectRequirements`] to the model
pub fn submit_project_requirements_tool() -> ToolDefinition {
    ToolDefinition {
        name: SUBMIT_PROJECT_REQUIREMENTS.to_owned(),
        description: "Submits the collected project requirements once all necessary details have been gathered \
                      from the user. This should be called when the user has provided enough information about \
                      their project."
            .to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "projectName": {
                    "type": "string",
                    "description": "The title or name of the project, e.g., 'E-commerce Website for Handmade Goods'."
                },
                "projectDescription": {
                    "type": "string",
                    "description": "A detailed summary of the project, what it aims to achieve, and its key features."
                },
                "skillsRequired": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "description": "Skill IDs matching the required skills. The available skills and their IDs are listed in the system instructions."
                },
                "budget": {
                    "type": "string",
                    "description": "The estimated budget or budget range, e.g., '$5,000' or '$3,000 - $7,000'."
                },
                "timeline": {
                    "type": "string",
                    "description": "The desired timeline or deadline, e.g., '3 months' or 'By end of Q4 2025'."
                },
                "notes": {
                    "type": "string",
                    "description": "Any other important information, e.g., 'Must be mobile-responsive'."
                }
            },
            "required": ["projectName", "projectDescription", "skillsRequired", "budget", "timeline"]
        }),
    }
}
