//! Error types for the packager command line.
//!
//! Library failures arrive as [`crate::bundler::Error`]; this module wraps
//! them with CLI-level errors and maps each class to recovery suggestions.

use thiserror::Error;

use crate::bundler;

/// Result type alias for packager operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for the packager binary
#[derive(Error, Debug)]
pub enum PackagerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Packaging errors
    #[error("{0}")]
    Bundler(#[from] bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

/// Innermost error below any added context.
fn root_cause(error: &bundler::Error) -> &bundler::Error {
    match error {
        bundler::Error::Context(_, inner) => root_cause(inner),
        other => other,
    }
}

impl PackagerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        let PackagerError::Bundler(error) = self else {
            return vec!["Run with --help to see the expected arguments".to_string()];
        };

        match root_cause(error) {
            bundler::Error::MissingOption(option) => vec![format!(
                "Provide a non-empty value for '{}'; see --help for usage",
                option
            )],
            bundler::Error::InvalidOption { option: "pack", .. } => {
                vec!["The only supported pack format is 'zip'".to_string()]
            }
            bundler::Error::OutputDirMissing(path) => vec![
                format!("Create the output directory: mkdir -p {}", path.display()),
                "Or pass an existing directory with --out".to_string(),
            ],
            bundler::Error::UnsupportedRuntime { .. } => vec![
                "Supported platforms are win32, darwin and linux".to_string(),
                "Supported architectures are x64, ia32, arm64 and arm".to_string(),
            ],
            bundler::Error::HttpError(_) | bundler::Error::Runtime(_) => vec![
                "Check your network connection and retry".to_string(),
                "Point --launchui-cache at a directory that already holds the runtime zip"
                    .to_string(),
            ],
            bundler::Error::HashMismatch { .. } => vec![
                "Delete the cached runtime archive and download it again".to_string(),
            ],
            bundler::Error::ResourceEdit { .. } | bundler::Error::CommandFailed { .. } => vec![
                "Install rcedit and make sure it is on PATH".to_string(),
                "On Linux and macOS, rcedit.exe also needs wine".to_string(),
            ],
            bundler::Error::Plist(_) => vec![
                "The runtime's Info.plist could not be parsed; try another --launchui-version"
                    .to_string(),
            ],
            bundler::Error::Locked(path) => vec![format!(
                "Another run is packaging {}; wait for it to finish",
                path.display()
            )],
            bundler::Error::Cancelled => {
                vec!["Run the same command again to rebuild the package".to_string()]
            }
            bundler::Error::GlobPattern(_) => {
                vec!["Check the --files patterns for unbalanced brackets".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bundler_messages_are_shown_unchanged() {
        let err = PackagerError::from(bundler::Error::MissingOption("entry"));
        assert_eq!(err.to_string(), "Invalid or missing option: entry");
    }

    #[test]
    fn suggestions_look_through_context() {
        let err = PackagerError::from(bundler::Error::Context(
            "building settings".into(),
            Box::new(bundler::Error::OutputDirMissing(PathBuf::from("/nope"))),
        ));
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("mkdir -p /nope"));
    }
}
