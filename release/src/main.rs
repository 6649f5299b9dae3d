//! Meson release CLI entrypoint.
//!
//! Parses the command line, installs the logger, and maps the outcome of the
//! selected subcommand to a process exit code.

use clap::Parser;
use meson_release::cli::Cli;
use meson_release::commands::run;
use meson_release::error::Result;
use meson_release::logging::init_logging;
use meson_release::output::write_stderr_line;
use meson_release::runner::SystemCommandRunner;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity, cli.quiet);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemCommandRunner, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Print any error and return the exit code it maps to. An abandoned release
/// note is reported but exits successfully.
fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, &err);
            err.exit_code()
        }
    }
}
