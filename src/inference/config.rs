//! Supervisor configuration loading and validation.
//!
//! Reads `supervisor.yaml` and resolves environment variables. Every field
//! has a default, so a missing file yields a usable configuration pointed
//! at a local completion proxy.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::InferenceError;

/// Name of the configuration file searched for by [`find_config_path`].
pub const CONFIG_FILE_NAME: &str = "supervisor.yaml";

/// Environment variable naming the directory that holds the config file.
pub const CONFIG_ROOT_ENV: &str = "CHAT_SUPERVISOR_ROOT";

// ─── Public Types ────────────────────────────────────────────────────────────

/// Top-level configuration (mirrors `supervisor.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorConfig {
    /// Scheme + host (+ optional port) of the completion proxy.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path appended to `base_url` for completion requests.
    #[serde(default = "default_responses_path")]
    pub responses_path: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Total timeout for a single completion request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// TCP connect timeout.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum completion calls per orchestration run. When the model is
    /// still requesting tools after this many calls, the run fails closed.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Optional prompt template overrides.
    #[serde(default)]
    pub prompts: PromptOverrides,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File paths replacing the built-in prompt templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptOverrides {
    #[serde(default)]
    pub supervisor_instructions: Option<String>,
    #[serde(default)]
    pub front_agent_instructions: Option<String>,
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write to `supervisor.log` under the data directory instead of stderr.
    #[serde(default)]
    pub log_to_file: bool,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            log_to_file: false,
            json: false,
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            responses_path: default_responses_path(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_turns: default_max_turns(),
            prompts: PromptOverrides::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SupervisorConfig {
    /// Full URL of the completion endpoint.
    pub fn responses_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.responses_path.trim_start_matches('/')
        )
    }

    /// Reject values that would make the client or loop unusable.
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.max_turns == 0 {
            return Err(InferenceError::ConfigError {
                reason: "max_turns must be at least 1".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(InferenceError::ConfigError {
                reason: "request_timeout_secs must be at least 1".into(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(InferenceError::ConfigError {
                reason: "model must not be empty".into(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(InferenceError::ConfigError {
                reason: format!("base_url must be http(s): '{}'", self.base_url),
            });
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_responses_path() -> String {
    "/api/responses".to_string()
}
fn default_model() -> String {
    "gpt-4.1".to_string()
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_max_turns() -> u32 {
    10
}
fn default_log_filter() -> String {
    "chat_supervisor=info,warn".to_string()
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate `supervisor.yaml`.
///
/// Checks `$CHAT_SUPERVISOR_ROOT` first, then walks upward from `start`.
/// Returns `None` when no file exists, in which case defaults apply.
pub fn find_config_path(start: &Path) -> Option<PathBuf> {
    let root = std::env::var_os(CONFIG_ROOT_ENV).map(PathBuf::from);
    search_config(root.as_deref(), start)
}

fn search_config(root: Option<&Path>, start: &Path) -> Option<PathBuf> {
    if let Some(root) = root {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load, interpolate and validate the configuration file.
///
/// String values matching `${VAR_NAME}` or `${VAR_NAME:-default}` are
/// resolved from the environment before parsing.
pub fn load_config(path: &Path) -> Result<SupervisorConfig, InferenceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| InferenceError::ConfigError {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    parse_config(&raw)
}

/// Parse configuration from YAML text.
pub fn parse_config(raw: &str) -> Result<SupervisorConfig, InferenceError> {
    let interpolated = interpolate_env_vars(raw);

    // An empty document deserializes as unit, not as a mapping.
    let config: SupervisorConfig = if interpolated.trim().is_empty() {
        SupervisorConfig::default()
    } else {
        serde_yaml::from_str(&interpolated).map_err(|e| InferenceError::ConfigError {
            reason: format!("failed to parse config: {e}"),
        })?
    };

    config.validate()?;
    Ok(config)
}

/// Find and load the configuration, falling back to defaults.
pub fn load_or_default(start: &Path) -> Result<SupervisorConfig, InferenceError> {
    match find_config_path(start) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading supervisor config");
            load_config(&path)
        }
        None => {
            tracing::info!("no {CONFIG_FILE_NAME} found, using defaults");
            Ok(SupervisorConfig::default())
        }
    }
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    if let Some(idx) = expr.find(":-") {
        let var_name = &expr[..idx];
        let default = &expr[idx + 2..];
        std::env::var(var_name).unwrap_or_else(|_| expand_tilde(default))
    } else {
        std::env::var(expr).unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
