//! CLI argument definitions for the meson release tool.
//!
//! Kept apart from the binary so the parser can be exercised in unit tests.

use crate::config::Configuration;
use crate::publish::github::DEFAULT_REPOSITORY;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Build, package, and publish meson framework releases.
#[derive(Parser, Debug)]
#[command(name = "meson-release")]
#[command(version, about)]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  MESON_GITHUB_TOKEN   Personal access token used by `upload`\n",
    "  MAS_BUILD            Name archives for the Mac App Store variant\n",
    "  CI                   Use a placeholder release note instead of $EDITOR\n",
    "  EDITOR               Release note editor [default: nano]\n",
    "  RUST_LOG             Override the log filter\n\n",
    "EXAMPLES:\n",
    "  Package the release build for this machine:\n",
    "    $ meson-release dist\n\n",
    "  Upload the packaged archives to the current draft:\n",
    "    $ meson-release upload --version v0.1.0",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Framework checkout to operate on [default: current directory].
    #[arg(long, global = true, value_name = "DIR")]
    pub source_root: Option<Utf8PathBuf>,

    /// Increase output verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and package the distributable archives.
    Dist(DistArgs),

    /// Upload packaged archives to a draft release.
    Upload(UploadArgs),

    /// Run the ninja build.
    Build(BuildArgs),

    /// Regenerate the framework version header.
    VersionHeader,
}

/// Target selection shared by `dist` and `upload`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetArgs {
    /// Platform to package for [default: this machine].
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Target architecture [default: the chromium download's, else x64].
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,
}

/// Arguments for the `dist` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DistArgs {
    /// Build configuration to package.
    #[arg(short, long, value_enum, default_value_t = Configuration::Release)]
    pub configuration: Configuration,

    /// Package existing build output without running ninja first.
    #[arg(long)]
    pub skip_build: bool,

    /// Platform and architecture overrides.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the `upload` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UploadArgs {
    /// Release tag to upload to [default: the manifest version].
    #[arg(long = "version", value_name = "TAG")]
    pub tag: Option<String>,

    /// Publish the draft once the uploads finish.
    #[arg(short, long)]
    pub publish_release: bool,

    /// Repository receiving the release, as `owner/name`.
    #[arg(long, default_value = DEFAULT_REPOSITORY)]
    pub repo: String,

    /// Platform and architecture overrides.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the `build` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    /// Configurations to build, in order.
    #[arg(
        short,
        long,
        value_enum,
        num_args = 1..,
        default_values_t = [Configuration::Release, Configuration::Debug]
    )]
    pub configuration: Vec<Configuration>,

    /// Build only this target instead of the platform's default targets.
    #[arg(short, long, value_name = "TARGET")]
    pub target: Option<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
