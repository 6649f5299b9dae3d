//! Release build orchestration through ninja.
//!
//! Each target is built with `ninja -C out/<C> <target>` from the source root.
//! The first failing target stops the build and its exit code is propagated.

use crate::config::{Configuration, SourceLayout};
use crate::error::{ReleaseError, Result};
use crate::runner::{CommandRunner, exit_code_of};
use camino::Utf8PathBuf;
use log::info;

/// Configuration for building a set of ninja targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Source root; ninja runs here.
    pub layout: SourceLayout,
    /// Path to the ninja executable.
    pub ninja: Utf8PathBuf,
    /// Targets to build, in order.
    pub targets: Vec<String>,
    /// Pass `-v` to ninja.
    pub verbose: bool,
}

/// Builds ninja targets for one or more configurations.
pub struct Builder<'a> {
    config: BuildConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Builder<'a> {
    /// Create a builder that runs ninja through `runner`.
    #[must_use]
    pub fn new(config: BuildConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Build every configured target for `configuration`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::BuildFailed`] carrying ninja's exit code for the
    /// first target that fails, or an I/O error if ninja cannot be spawned.
    pub fn build(&self, configuration: Configuration) -> Result<()> {
        let build_dir = Utf8PathBuf::from("out").join(configuration.out_dir_name());
        for target in &self.config.targets {
            info!("building {target} ({configuration})");
            let mut args = vec!["-C", build_dir.as_str(), target.as_str()];
            if self.config.verbose {
                args.push("-v");
            }
            let status =
                self.runner
                    .run_inherited(self.config.ninja.as_str(), &args, self.config.layout.root())?;
            if !status.success() {
                return Err(ReleaseError::BuildFailed {
                    target: target.clone(),
                    code: exit_code_of(status),
                });
            }
        }
        Ok(())
    }

    /// Build every configured target for each configuration in turn.
    ///
    /// # Errors
    ///
    /// As [`Builder::build`]; later configurations are not attempted after a
    /// failure.
    pub fn build_all(&self, configurations: &[Configuration]) -> Result<()> {
        configurations
            .iter()
            .try_for_each(|configuration| self.build(*configuration))
    }
}
