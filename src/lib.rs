pub mod agent_core;
pub mod commands;
pub mod inference;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent_core::{CareDataProvider, Supervisor, SupervisorError};
use commands::{DelegationTool, FrontAgentConfig};
use inference::config::load_or_default;
use inference::{LoggingConfig, SupervisorConfig};

/// Return the platform-standard data directory for log files.
///
/// - macOS: `~/Library/Application Support/chat-supervisor/`
/// - Windows: `{FOLDERID_RoamingAppData}\chat-supervisor\`
/// - Linux: `$XDG_DATA_HOME/chat-supervisor/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.chat-supervisor/` only if none of the above can be resolved.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("chat-supervisor");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chat-supervisor")
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.filter`. With `log_to_file`, existing logs
/// are rotated (keeps the last 3) and a fresh `supervisor.log` is opened with
/// a line-flushing writer under [`data_dir`].
pub fn init_tracing(config: &LoggingConfig) -> Result<(), SupervisorError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (writer, log_path) = if config.log_to_file {
        let log_dir = data_dir();
        let log_path = open_log_path(&log_dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| SupervisorError::Config {
                reason: format!("failed to open {}: {e}", log_path.display()),
            })?;
        (BoxMakeWriter::new(FlushingWriter::new(file)), Some(log_path))
    } else {
        (BoxMakeWriter::new(std::io::stderr), None)
    };

    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_path.is_none())
        .with_target(true)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| SupervisorError::Config {
        reason: format!("failed to install tracing subscriber: {e}"),
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = ?log_path.as_ref().map(|p| p.display().to_string()),
        pid = std::process::id(),
        "=== chat-supervisor starting ==="
    );
    Ok(())
}

/// Create `log_dir` and rotate any existing `supervisor.log` inside it.
fn open_log_path(log_dir: &Path) -> Result<PathBuf, SupervisorError> {
    std::fs::create_dir_all(log_dir).map_err(|e| SupervisorError::Config {
        reason: format!("failed to create {}: {e}", log_dir.display()),
    })?;
    let log_path = log_dir.join("supervisor.log");
    rotate_log_file(&log_path, 3);
    Ok(log_path)
}

/// Rotate log files: `supervisor.log` → `supervisor.log.1` → `.2` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &Path, keep: u32) {
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
#[derive(Clone)]
struct FlushingWriter {
    file: Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ─── Wiring ─────────────────────────────────────────────────────────────────

/// Everything the realtime runtime needs: agent configs plus the tool
/// implementation behind the front agent's single tool.
#[derive(Clone)]
pub struct ChatSupervisorScenario {
    pub agents: Vec<FrontAgentConfig>,
    pub delegation: DelegationTool,
}

impl ChatSupervisorScenario {
    /// Build the scenario from configuration and a data provider.
    pub fn from_config(
        config: &SupervisorConfig,
        data: Arc<dyn CareDataProvider>,
    ) -> Result<Self, SupervisorError> {
        let supervisor = Supervisor::from_config(config, data)?;
        let agents = commands::chat_supervisor_scenario(supervisor.prompts());

        tracing::info!(
            model = %config.model,
            endpoint = %config.responses_url(),
            max_turns = config.max_turns,
            agents = agents.len(),
            "chat-supervisor scenario ready"
        );

        Ok(Self {
            agents,
            delegation: DelegationTool::new(Arc::new(supervisor)),
        })
    }

    /// Locate `supervisor.yaml` from `start` (or `$CHAT_SUPERVISOR_ROOT`) and
    /// build the scenario. Defaults apply when no file is found.
    pub fn discover(start: &Path, data: Arc<dyn CareDataProvider>) -> Result<Self, SupervisorError> {
        let config = load_or_default(start)?;
        Self::from_config(&config, data)
    }
}
