//! Meson release tooling library.
//!
//! Builds the framework with ninja, stages and archives the distributable
//! bundle for a platform, and publishes the archives with their checksums to
//! a draft release. The `meson-release` binary is a thin shell over
//! [`commands::run`].
//!
//! # Modules
//!
//! - [`artefact`] - Archive naming, bundle tables, zip writing, checksums
//! - [`build`] - Ninja build orchestration
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Subcommand orchestration
//! - [`config`] - Build manifest loading and source tree layout
//! - [`error`] - Error types and exit code mapping
//! - [`logging`] - Logger initialisation
//! - [`output`] - User-facing progress messages
//! - [`packager`] - Bundle assembly
//! - [`publish`] - Draft releases and asset upload
//! - [`runner`] - External command execution
//! - [`stager`] - Staging directory management
//! - [`version_header`] - Framework version header generation

pub mod artefact;
pub mod build;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod packager;
pub mod publish;
pub mod runner;
pub mod stager;
pub mod version_header;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
