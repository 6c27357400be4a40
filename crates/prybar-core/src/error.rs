//! Error types for the dispatch engine with categorization:
//!
//! - **Configuration errors**: broken command metadata, malformed argument
//!   vectors, bad user input (exit code 1)
//! - **System errors**: IO failures, child process failures (exit code 2)
//!
//! A command spawned by dispatch reports its own exit status through
//! [`Error::CommandFailed`], which forwards the child's code.

use std::path::PathBuf;

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for command discovery and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A loaded command candidate declares no command names.
    #[error("command loaded from {origin} declares no command names")]
    MissingCommandNames {
        /// Provider type name or package path that produced the candidate.
        origin: String,
    },

    /// A manifest-declared command names no program to run.
    #[error("command '{name}' from {origin} declares no program")]
    MissingProgram { origin: String, name: String },

    /// Two candidates claimed the same primary command name.
    #[error("command name '{name}' is declared by both {first} and {second}")]
    DuplicateCommandName {
        name: String,
        first: String,
        second: String,
    },

    /// An extensions path exists but is not a directory.
    #[error("{} exists but is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    /// The user home directory could not be determined.
    #[error("could not determine the user home directory")]
    NoHomeDirectory,

    /// No registered command matched the first canonical token.
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },

    /// A flag token was not declared by the resolved command.
    #[error("unknown flag '{flag}' for command '{command}'")]
    UnknownFlag { flag: String, command: String },

    /// A valued flag was not followed by a value token.
    #[error("flag '{flag}' expects a value")]
    MissingFlagValue { flag: String },

    /// A command was invoked without a required positional argument.
    #[error("command '{command}' requires {what}")]
    MissingArgument { command: String, what: String },

    /// An argument holder of the wrong type was attached to a command.
    #[error("command '{command}' was given an argument holder of the wrong type")]
    ArgsMismatch { command: &'static str },

    /// An extension package failed install-time validation.
    #[error("invalid extension package {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    /// No installed extension package matched the given name.
    #[error("no extension package named '{name}' is installed")]
    UnknownExtension { name: String },

    /// An IO operation failed.
    #[error("failed to {action}: {source}")]
    Io {
        action: String,
        source: std::io::Error,
    },

    /// A dispatched command's child process exited unsuccessfully.
    #[error("command '{name}' failed{}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    CommandFailed { name: String, code: Option<i32> },
}

impl Error {
    /// Create a system error from a failed IO operation.
    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }

    /// Returns the process exit code for this error.
    ///
    /// Exit code scheme:
    /// - 1: configuration or usage error (bad metadata, bad argument vector)
    /// - 2: system error (IO, spawn failures)
    /// - child's own code for a failed dispatched command
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCommandNames { .. }
            | Self::MissingProgram { .. }
            | Self::DuplicateCommandName { .. }
            | Self::NotADirectory { .. }
            | Self::UnknownCommand { .. }
            | Self::UnknownFlag { .. }
            | Self::MissingFlagValue { .. }
            | Self::MissingArgument { .. }
            | Self::ArgsMismatch { .. }
            | Self::InvalidManifest { .. }
            | Self::UnknownExtension { .. } => 1,
            Self::NoHomeDirectory | Self::Io { .. } => 2,
            Self::CommandFailed { code, .. } => match code {
                Some(code) => *code,
                None => 2,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_names_display() {
        let err = Error::MissingCommandNames {
            origin: "sample.toml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command loaded from sample.toml declares no command names"
        );
    }

    #[test]
    fn test_exit_code_configuration_errors() {
        assert_eq!(
            Error::MissingCommandNames {
                origin: "x".to_string()
            }
            .exit_code(),
            1
        );
        assert_eq!(
            Error::UnknownCommand {
                name: "x".to_string()
            }
            .exit_code(),
            1
        );
        assert_eq!(
            Error::MissingFlagValue {
                flag: "--base".to_string()
            }
            .exit_code(),
            1
        );
        assert_eq!(
            Error::NotADirectory {
                path: PathBuf::from("/tmp/x")
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_exit_code_system_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::io("scan extensions", io).exit_code(), 2);
        assert_eq!(Error::NoHomeDirectory.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_command_failed_forwards_child_code() {
        let err = Error::CommandFailed {
            name: "deploy".to_string(),
            code: Some(7),
        };
        assert_eq!(err.exit_code(), 7);
        let killed = Error::CommandFailed {
            name: "deploy".to_string(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 2);
    }

    #[test]
    fn test_command_failed_display() {
        let err = Error::CommandFailed {
            name: "deploy".to_string(),
            code: Some(7),
        };
        assert_eq!(err.to_string(), "command 'deploy' failed with exit code 7");
    }
}
