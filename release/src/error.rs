//! Error types for the meson release tooling.
//!
//! Every failure aborts the current command. Variants carry the context a
//! user needs to diagnose the failure without re-running in verbose mode: the
//! missing path, the failing tool's exit code, or the HTTP status.

use crate::publish::PublishError;
use camino::Utf8PathBuf;
use meson_common::PlatformError;
use thiserror::Error;

/// Errors that can occur while building, packaging, or publishing.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The build manifest is missing, malformed, or lacks a required field.
    #[error("invalid build configuration at {path}: {reason}")]
    Config {
        /// Path to the offending manifest.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A platform identifier outside the supported set was requested.
    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    /// A file or directory the bundle needs was not produced by the build.
    #[error("missing build artefact: {path}")]
    MissingArtifact {
        /// Path that was expected to exist.
        path: Utf8PathBuf,
    },

    /// The release build exited unsuccessfully.
    #[error("build of {target} failed with exit code {code}")]
    BuildFailed {
        /// The build target that failed.
        target: String,
        /// Exit code reported by the build tool.
        code: i32,
    },

    /// An external tool other than the build exited unsuccessfully.
    #[error("{command} failed with exit code {code}: {stderr}")]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Exit code reported by the tool.
        code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A hosting API operation failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Writing a zip archive failed.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Walking a bundle directory failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A path could not be represented as UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl ReleaseError {
    /// Return the process exit code for this error.
    ///
    /// Build and tool failures propagate the tool's own exit code. Aborting on
    /// an empty release note is not a failure and maps to zero. Everything
    /// else is one of this tool's own validation failures and maps to one.
    ///
    /// # Examples
    ///
    /// ```
    /// use meson_release::error::ReleaseError;
    ///
    /// let err = ReleaseError::BuildFailed { target: "Meson".to_owned(), code: 2 };
    /// assert_eq!(err.exit_code(), 2);
    /// ```
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BuildFailed { code, .. } | Self::CommandFailed { code, .. } => *code,
            Self::Publish(PublishError::EmptyReleaseNotes) => 0,
            _ => 1,
        }
    }
}

/// Result type alias using [`ReleaseError`].
pub type Result<T> = std::result::Result<T, ReleaseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn missing_artifact_names_the_path() {
        let err = ReleaseError::MissingArtifact {
            path: Utf8PathBuf::from("out/R/libmeson.so"),
        };
        assert!(err.to_string().contains("out/R/libmeson.so"));
    }

    #[test]
    fn unsupported_platform_surfaces_identifier() {
        let err: ReleaseError = "sunos"
            .parse::<meson_common::Platform>()
            .expect_err("sunos is unsupported")
            .into();
        assert!(err.to_string().contains("sunos"));
        assert_eq!(err.exit_code(), 1);
    }

    #[rstest]
    #[case::build(ReleaseError::BuildFailed { target: "Meson".to_owned(), code: 3 }, 3)]
    #[case::command(
        ReleaseError::CommandFailed {
            command: "zip -r -y".to_owned(),
            code: 12,
            stderr: String::new(),
        },
        12
    )]
    #[case::empty_notes(ReleaseError::Publish(PublishError::EmptyReleaseNotes), 0)]
    #[case::config(
        ReleaseError::Config {
            path: Utf8PathBuf::from("meson.toml"),
            reason: "missing version".to_owned(),
        },
        1
    )]
    fn exit_code_propagates_tool_codes(#[case] err: ReleaseError, #[case] expected: i32) {
        assert_eq!(err.exit_code(), expected);
    }

    #[test]
    fn publish_error_keeps_http_status_in_message() {
        let err = ReleaseError::from(PublishError::Http {
            method: "POST",
            url: "https://api.github.com/repos/go-meson/framework/releases".to_owned(),
            status: 422,
            body: "already_exists".to_owned(),
        });
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("already_exists"));
    }
}
