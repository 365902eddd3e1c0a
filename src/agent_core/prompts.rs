//! Prompt templates for both agents.
//!
//! Prompt wording is configuration, not logic: the built-ins live in
//! `prompts/*.md` and are compiled in, and either can be replaced by a file
//! named in `supervisor.yaml`. Control-flow code only ever reads `text`.

use std::path::Path;

use crate::inference::config::{expand_tilde, PromptOverrides};

use super::errors::SupervisorError;

/// Bumped whenever the built-in wording changes.
pub const BUILTIN_PROMPT_VERSION: &str = "2025-06-1";

/// A named, versioned prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    /// `BUILTIN_PROMPT_VERSION` for compiled-in text, `file:<path>` for overrides.
    pub version: String,
    pub text: String,
}

impl PromptTemplate {
    fn builtin(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            version: BUILTIN_PROMPT_VERSION.to_string(),
            text: text.to_string(),
        }
    }

    /// Read a template from disk.
    pub fn from_file(name: &str, path: &Path) -> Result<Self, SupervisorError> {
        let text = std::fs::read_to_string(path).map_err(|e| SupervisorError::Config {
            reason: format!("failed to read prompt '{name}' from {}: {e}", path.display()),
        })?;
        if text.trim().is_empty() {
            return Err(SupervisorError::Config {
                reason: format!("prompt '{name}' at {} is empty", path.display()),
            });
        }
        Ok(Self {
            name: name.to_string(),
            version: format!("file:{}", path.display()),
            text,
        })
    }
}

/// The two prompts this crate needs.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub supervisor_instructions: PromptTemplate,
    pub front_agent_instructions: PromptTemplate,
}

impl PromptSet {
    pub fn builtin() -> Self {
        Self {
            supervisor_instructions: PromptTemplate::builtin(
                "supervisor_instructions",
                include_str!("../../prompts/supervisor.md"),
            ),
            front_agent_instructions: PromptTemplate::builtin(
                "front_agent_instructions",
                include_str!("../../prompts/front_agent.md"),
            ),
        }
    }

    /// Built-ins with any configured file overrides applied.
    pub fn load(overrides: &PromptOverrides) -> Result<Self, SupervisorError> {
        let mut set = Self::builtin();

        if let Some(path) = &overrides.supervisor_instructions {
            set.supervisor_instructions =
                PromptTemplate::from_file("supervisor_instructions", Path::new(&expand_tilde(path)))?;
        }
        if let Some(path) = &overrides.front_agent_instructions {
            set.front_agent_instructions =
                PromptTemplate::from_file("front_agent_instructions", Path::new(&expand_tilde(path)))?;
        }

        tracing::debug!(
            supervisor = %set.supervisor_instructions.version,
            front_agent = %set.front_agent_instructions.version,
            "prompt templates loaded"
        );
        Ok(set)
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_versioned_and_non_empty() {
        let set = PromptSet::builtin();
        assert_eq!(set.supervisor_instructions.version, BUILTIN_PROMPT_VERSION);
        assert!(set.supervisor_instructions.text.contains("get_patient_details"));
        assert!(set
            .front_agent_instructions
            .text
            .contains("getNextResponseFromSupervisor"));
    }

    #[test]
    fn file_override_replaces_one_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sup.md");
        std::fs::write(&path, "You are a test supervisor.").unwrap();

        let overrides = PromptOverrides {
            supervisor_instructions: Some(path.display().to_string()),
            front_agent_instructions: None,
        };
        let set = PromptSet::load(&overrides).unwrap();
        assert_eq!(set.supervisor_instructions.text, "You are a test supervisor.");
        assert!(set.supervisor_instructions.version.starts_with("file:"));
        assert_eq!(set.front_agent_instructions.version, BUILTIN_PROMPT_VERSION);
    }

    #[test]
    fn missing_or_empty_override_is_config_error() {
        let overrides = PromptOverrides {
            supervisor_instructions: Some("/nonexistent/prompt.md".into()),
            front_agent_instructions: None,
        };
        assert!(matches!(
            PromptSet::load(&overrides),
            Err(SupervisorError::Config { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        std::fs::write(&path, "  \n").unwrap();
        assert!(PromptTemplate::from_file("x", &path).is_err());
    }
}
