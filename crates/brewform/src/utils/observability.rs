use console::style;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info, warn};

//-------------------------------------------------------------------------------
// Error Handling
//-------------------------------------------------------------------------------

/// Centralized error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A brew command ran but exited non-zero
    #[error("Execution of '{command}' returned non-zero: {output}")]
    ExecutionFailure { command: String, output: String },

    /// A brew command could not be started at all
    #[error("Could not execute '{command}': {source}")]
    Spawn { command: String, source: io::Error },

    #[error("Checksum error for package {package} in files {}", display_paths(.files))]
    ChecksumMismatch { package: String, files: Vec<PathBuf> },

    #[error(
        "Homebrew does not support installations owned by the \"root\" user. Please check the permissions of {}",
        .path.display()
    )]
    RootOwnedInstallation { path: PathBuf },

    #[error("Could not determine the owner of {}: {source}", .path.display())]
    OwnerLookup { path: PathBuf, source: io::Error },

    #[error("Could not find a home directory for uid {uid}")]
    HomeLookup { uid: u32 },

    #[error("Could not detect the Homebrew version from: {0}")]
    VersionDetection(String),

    #[error("Could not install package: {0}")]
    Install(String),

    #[error("Could not uninstall package: {0}")]
    Uninstall(String),

    #[error("Could not list packages: {0}")]
    ListPackages(String),

    #[error("Could not tap resource: {0}")]
    Tap(String),

    #[error("Could not untap resource: {0}")]
    Untap(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("{failed} resource(s) failed to apply")]
    ApplyFailed { failed: usize },

    #[error(transparent)]
    Config(#[from] brewform_core::ConfigError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ProviderError {
    /// Whether the error came from a command that ran and failed, the
    /// only kind of failure that triggers the cask fallback
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, ProviderError::ExecutionFailure { .. })
    }
}

fn display_paths(files: &[PathBuf]) -> String {
    let joined: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    format!("[{}]", joined.join(", "))
}

/// Centralized Result type for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Extension trait for Result to add context to errors
pub trait ResultExt<T, E> {
    /// Add context to an error
    fn with_context<C, F>(self, context: F) -> ProviderResult<T>
    where
        F: FnOnce() -> C,
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn with_context<C, F>(self, context: F) -> ProviderResult<T>
    where
        F: FnOnce() -> C,
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| ProviderError::Anyhow(anyhow::Error::new(err).context(context())))
    }
}

//-------------------------------------------------------------------------------
// Logging
//-------------------------------------------------------------------------------

/// Log a success message
pub fn log_success(message: &str) {
    info!("{}", message);
    println!("{} {}", style("✓").bold().green(), message);
}

/// Log a warning message
pub fn log_warning(message: &str) {
    warn!("{}", message);
    println!("{} {}", style("!").bold().yellow(), message);
}

/// Log an error message
pub fn log_error(message: &str) {
    error!("{}", message);
    eprintln!("{} {}", style("✗").bold().red(), message);
}

/// Log a step message
pub fn log_step(message: &str) {
    debug!("{}", message);
    println!("{} {}", style("→").bold().blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_message_names_package_and_files() {
        let err = ProviderError::ChecksumMismatch {
            package: "wget".to_string(),
            files: vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")],
        };
        assert_eq!(
            err.to_string(),
            "Checksum error for package wget in files [/tmp/a, /tmp/b]"
        );
    }

    #[test]
    fn only_execution_failures_trigger_fallback() {
        let failure = ProviderError::ExecutionFailure {
            command: "brew info foo".to_string(),
            output: "Error: No available formula".to_string(),
        };
        assert!(failure.is_execution_failure());
        assert!(!ProviderError::HomeLookup { uid: 501 }.is_execution_failure());
        assert!(!ProviderError::RootOwnedInstallation { path: PathBuf::from("/usr/local/bin/brew") }
            .is_execution_failure());
    }

    #[test]
    fn context_wraps_source_error() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.with_context(|| "Failed to read manifest").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read manifest"));
    }
}
