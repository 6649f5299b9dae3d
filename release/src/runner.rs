//! Capability interface for external tools.
//!
//! The build tool, the archiver, the binary stripper, and the release note
//! editor are all reached through [`CommandRunner`], so tests can replace
//! them without spawning processes.

use crate::error::Result;
use camino::Utf8Path;
use log::{debug, trace};
use std::process::{Command, ExitStatus, Output};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `cmd` with `args` in `cwd` and captures its output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use camino::Utf8Path;
    /// use meson_release::runner::{CommandRunner, SystemCommandRunner};
    ///
    /// let runner = SystemCommandRunner;
    /// let output = runner.run("zip", &["-v"], Utf8Path::new("."))?;
    /// assert!(output.status.success());
    /// # Ok::<(), meson_release::error::ReleaseError>(())
    /// ```
    fn run<'a>(&self, cmd: &str, args: &[&'a str], cwd: &Utf8Path) -> Result<Output>;

    /// Runs `cmd` with `args` in `cwd`, sharing this process's standard
    /// streams, and returns its exit status.
    ///
    /// Used for tools whose output the user should watch (the build) or
    /// interact with (the editor).
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or waiting for the
    /// command.
    fn run_inherited<'a>(&self, cmd: &str, args: &[&'a str], cwd: &Utf8Path) -> Result<ExitStatus>;
}

/// Runs commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run<'a>(&self, cmd: &str, args: &[&'a str], cwd: &Utf8Path) -> Result<Output> {
        debug!("running {} in {cwd}", command_line(cmd, args));
        let output = Command::new(cmd).args(args).current_dir(cwd).output()?;
        trace!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        trace!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        Ok(output)
    }

    fn run_inherited<'a>(&self, cmd: &str, args: &[&'a str], cwd: &Utf8Path) -> Result<ExitStatus> {
        debug!("running {} in {cwd}", command_line(cmd, args));
        Ok(Command::new(cmd).args(args).current_dir(cwd).status()?)
    }
}

/// Render a command and its arguments as a single line for messages.
///
/// # Examples
///
/// ```
/// use meson_release::runner::command_line;
///
/// assert_eq!(command_line("zip", &["-r", "-y", "out.zip"]), "zip -r -y out.zip");
/// ```
#[must_use]
pub fn command_line(cmd: &str, args: &[&str]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Return the exit code of a finished process.
///
/// Processes killed by a signal have no code; they are reported as `1`.
#[must_use]
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
