use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::process::SupervisorError;

pub type CoreResult<T> = Result<T, CoreError>;

/// Unified error for diff, supervision and transform.
/// - Every variant carries enough context (path, program, stderr tail) to be
///   reported without the caller re-inspecting the filesystem.
/// - `From<SupervisorError>` enables `?` from the process layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A file could not be opened, read, created or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The executable could not be started (missing, not executable).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child ran but failed or overran its wall-clock limit.
    #[error("{program} {failure}")]
    Process {
        program: String,
        failure: ProcessFailure,
        stderr_tail: String,
    },

    /// The child exited without producing its contracted output.
    #[error("{tool}: {reason}")]
    ExternalTool { tool: String, reason: String },

    /// A precondition on the inputs was not met.
    #[error("input missing: {0}")]
    InputMissing(String),

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        CoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn external_tool(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::ExternalTool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// True for caller-side precondition failures (bad request territory).
    pub fn is_input_error(&self) -> bool {
        matches!(self, CoreError::InputMissing(_))
    }
}

/// Why a supervised process is considered failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessFailure {
    /// Exited with a non-zero code.
    ExitCode(i32),
    /// Terminated without an exit code (killed by a signal).
    Signalled,
    /// Killed after exceeding the configured wall-clock ceiling.
    TimedOut { limit: Duration },
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFailure::ExitCode(code) => write!(f, "exited with code {}", code),
            ProcessFailure::Signalled => f.write_str("was terminated by a signal"),
            ProcessFailure::TimedOut { limit } => {
                write!(f, "exceeded wall-clock limit of {}s and was killed", limit.as_secs())
            }
        }
    }
}

impl From<SupervisorError> for CoreError {
    fn from(e: SupervisorError) -> Self {
        match e {
            SupervisorError::Spawn { program, source } => CoreError::Spawn { program, source },
            SupervisorError::Io { program, source } => CoreError::Io {
                path: PathBuf::from(program),
                source,
            },
            SupervisorError::Exited { run } => CoreError::Process {
                program: run.program.clone(),
                failure: match run.exit_code {
                    Some(code) => ProcessFailure::ExitCode(code),
                    None => ProcessFailure::Signalled,
                },
                stderr_tail: run.stderr_lossy(),
            },
            SupervisorError::TimedOut { program, limit, .. } => CoreError::Process {
                program,
                failure: ProcessFailure::TimedOut { limit },
                stderr_tail: String::new(),
            },
        }
    }
}
