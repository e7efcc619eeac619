//! Shared error and exit-code model for CLI commands.

use std::fmt;
use std::path::PathBuf;

use crate::config::Config;

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Invalid input data or configuration, or nothing to do
    Validation = 1,
    /// File could not be read, parsed or written
    Io = 2,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Category of a CLI failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// File system or format failure
    Io,
    /// Invalid data or arguments
    Validation,
    /// The run could not do anything useful; reported as a warning
    Warning,
}

/// Error returned by command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Failure category
    pub kind: CliErrorKind,
    /// Message shown to the operator
    pub message: String,
}

impl CliError {
    /// I/O or parse failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
        }
    }

    /// Validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Validation,
            message: message.into(),
        }
    }

    /// Run aborted without doing anything.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Warning,
            message: message.into(),
        }
    }

    /// Exit code this error maps to.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            CliErrorKind::Io => ExitCode::Io,
            CliErrorKind::Validation | CliErrorKind::Warning => ExitCode::Validation,
        }
    }

    /// Prefix printed before the message.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.kind {
            CliErrorKind::Io | CliErrorKind::Validation => "Error:",
            CliErrorKind::Warning => "[WARN]",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type of command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit config file (`--config`) instead of the default location
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// Config file the command reads and writes.
    pub fn config_path(&self) -> CliResult<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path()
                .map_err(|e| CliError::io(format!("Failed to locate configuration: {}", describe(&e)))),
        }
    }

    /// Loads the configuration, falling back to defaults when the file is absent.
    pub fn load_config(&self) -> CliResult<Config> {
        let path = self.config_path()?;
        Config::load_from(&path).map_err(|e| {
            CliError::validation(format!("Failed to load configuration: {}", describe(&e)))
        })
    }
}

/// Renders an anyhow error with its full context chain on one line.
pub fn describe(error: &anyhow::Error) -> String {
    format!("{error:#}")
}
