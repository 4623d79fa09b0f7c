//! Error types for packaging operations.
//!
//! Every pipeline stage returns [`Result`] and the first error stops the run.
//! Errors from collaborators (HTTP, zip, plist, rcedit) are carried unchanged
//! inside the matching variant so the caller sees the original cause.
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the packager.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "renaming executable")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// A required option is missing or empty.
    #[error("Invalid or missing option: {0}")]
    MissingOption(&'static str),

    /// An option has a value outside its allowed set.
    #[error("Invalid value of option: {option} ({value})")]
    InvalidOption {
        /// Option name
        option: &'static str,
        /// Rejected value
        value: String,
    },

    /// The output directory must exist before packaging starts.
    #[error("Output directory does not exist: {0}")]
    OutputDirMissing(PathBuf),

    /// The runtime provider could not supply an artifact.
    #[error("runtime provider error: {0}")]
    Runtime(String),

    /// No runtime build is published for this platform/architecture.
    #[error("no runtime available for {platform}-{arch}")]
    UnsupportedRuntime {
        /// Requested platform
        platform: String,
        /// Requested architecture
        arch: String,
    },

    /// Child process execution error.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// The executable resource editor rejected the edit.
    #[error("resource edit of {path} failed: {reason}")]
    ResourceEdit {
        /// Executable being edited
        path: PathBuf,
        /// Tool output
        reason: String,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking directory (archiving).
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// ZIP archive creation/extraction error.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Property list (Info.plist) parsing/writing error.
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// HTTP client error (runtime download).
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Hash mismatch for downloaded files.
    #[error("hash mismatch of downloaded file: expected {expected}, got {actual}")]
    HashMismatch {
        /// Expected hash value
        expected: String,
        /// Actual hash value
        actual: String,
    },

    /// Invalid glob pattern for resource files.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Glob execution error for resource files.
    #[error("{0}")]
    Glob(#[from] glob::GlobError),

    /// Another run holds the lock for this package target.
    #[error("package target {0} is locked by another run")]
    Locked(PathBuf),

    /// The run was cancelled before it finished.
    #[error("packaging cancelled")]
    Cancelled,

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns true for errors raised while validating the request, before any I/O.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::MissingOption(_) | Error::InvalidOption { .. } | Error::OutputDirMissing(_) => {
                true
            }
            Error::Context(_, inner) => inner.is_validation(),
            _ => false,
        }
    }

    /// Returns true if the run was cancelled, looking through added context.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Context(_, inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the packager's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying entry script".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_path_and_cause() {
        let err = std::fs::read("/definitely/not/here")
            .fs_context("reading entry script", "/definitely/not/here")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("reading entry script /definitely/not/here"));
        assert!(matches!(err, Error::Fs { .. }));
    }

    #[test]
    fn validation_errors_are_classified() {
        assert!(Error::MissingOption("name").is_validation());
        assert!(Error::InvalidOption { option: "pack", value: "tar".into() }.is_validation());
        let wrapped: Result<()> = Err(Error::OutputDirMissing(PathBuf::from("/x")));
        assert!(wrapped.context("building settings").unwrap_err().is_validation());
        assert!(!Error::Cancelled.is_validation());
    }

    #[test]
    fn cancellation_is_seen_through_context() {
        let wrapped: Result<()> = Err(Error::Cancelled);
        assert!(wrapped.context("extracting runtime").unwrap_err().is_cancelled());
        assert!(!Error::GenericError("boom".into()).is_cancelled());
    }

    #[test]
    fn missing_option_message_names_the_field() {
        assert_eq!(
            Error::MissingOption("version").to_string(),
            "Invalid or missing option: version"
        );
    }
}
