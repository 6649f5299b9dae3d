//! Subcommand orchestration.
//!
//! [`run`] wires the real collaborators (the host's command runner, the
//! GitHub client, the environment-selected release notes) into the
//! `run_*` functions, which take their collaborators as parameters and
//! report results as values.

use crate::artefact::manifest::PlatformManifest;
use crate::build::{BuildConfig, Builder};
use crate::cli::{BuildArgs, Cli, Command, DistArgs, TargetArgs, UploadArgs};
use crate::config::{BuildManifest, SourceLayout};
use crate::error::{ReleaseError, Result};
use crate::output::{header_message, packaged_message, uploaded_message, write_stderr_line};
use crate::packager::{PackageOutput, Packager, PackagerConfig};
use crate::publish::api::ReleaseApi;
use crate::publish::github::GitHubClient;
use crate::publish::notes::{ReleaseNotes, notes_from_env};
use crate::publish::publisher::ReleasePublisher;
use crate::runner::CommandRunner;
use crate::version_header::update_version_header;
use camino::Utf8PathBuf;
use log::info;
use meson_common::{Platform, TargetArch, host_arch};
use std::io::Write;

/// Outcome of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Display name of the release that received the assets.
    pub release_name: String,
    /// Archives uploaded, each followed by its checksum.
    pub archives: Vec<Utf8PathBuf>,
    /// Whether the release was published afterwards.
    pub published: bool,
}

/// Execute the parsed command line.
///
/// # Errors
///
/// Returns the first error raised by the selected subcommand.
pub fn run(cli: &Cli, runner: &dyn CommandRunner, stderr: &mut dyn Write) -> Result<()> {
    let verbose = cli.verbosity > 0;
    let mut progress = |message: String| {
        if !cli.quiet {
            write_stderr_line(stderr, message);
        }
    };

    match &cli.command {
        Command::Dist(args) => {
            let output = run_dist(args, &source_layout(cli)?, verbose, runner)?;
            progress(packaged_message(&output));
        }
        Command::Upload(args) => {
            let api = GitHubClient::from_env(args.repo.as_str())?;
            let notes = notes_from_env(runner);
            let report = run_upload(args, &source_layout(cli)?, &api, notes.as_ref())?;
            for archive in &report.archives {
                progress(uploaded_message(archive, &report.release_name));
            }
            if report.published {
                progress(format!("Published {}", report.release_name));
            }
        }
        Command::Build(args) => run_build(args, &source_layout(cli)?, verbose, runner)?,
        Command::VersionHeader => {
            let (path, written) = run_version_header(&source_layout(cli)?)?;
            progress(header_message(&path, written));
        }
    }
    Ok(())
}

/// The checkout named by `--source-root`, or the working directory.
///
/// The root is made absolute because ninja and the archiver run with a
/// different working directory.
fn source_layout(cli: &Cli) -> Result<SourceLayout> {
    match &cli.source_root {
        Some(root) => SourceLayout::resolve(root),
        None => SourceLayout::from_current_dir(),
    }
}

/// Resolve the packaging platform and target architecture, applying
/// command-line overrides.
///
/// # Errors
///
/// Returns [`ReleaseError::UnsupportedPlatform`] for an unknown platform
/// name, or an I/O error if the architecture marker cannot be read.
pub fn resolve_target(target: &TargetArgs, layout: &SourceLayout) -> Result<(Platform, TargetArch)> {
    let platform = match &target.platform {
        Some(name) => name.parse::<Platform>()?,
        None => Platform::current()?,
    };
    let arch = match &target.arch {
        Some(arch) => TargetArch::new(arch.as_str()),
        None => TargetArch::detect(&layout.target_arch_marker())?,
    };
    info!("target {platform}/{arch} (host arch {})", host_arch());
    Ok((platform, arch))
}

fn packager_config(
    layout: &SourceLayout,
    manifest: &BuildManifest,
    target: &TargetArgs,
) -> Result<(Platform, PackagerConfig)> {
    let (platform, arch) = resolve_target(target, layout)?;
    let config = PackagerConfig::for_layout(layout, manifest.names().clone(), manifest.version(), arch);
    Ok((platform, config))
}

/// Build (unless skipped) and package the distributable archives.
///
/// # Errors
///
/// Returns configuration, build, staging, or archiving failures.
pub fn run_dist(
    args: &DistArgs,
    layout: &SourceLayout,
    verbose: bool,
    runner: &dyn CommandRunner,
) -> Result<PackageOutput> {
    let manifest = BuildManifest::load(&layout.manifest())?;
    let (platform, config) = packager_config(layout, &manifest, &args.target)?;

    let mut packager = Packager::new(config, runner);
    if !args.skip_build {
        let build_config = BuildConfig {
            layout: layout.clone(),
            ninja: layout.ninja(Platform::current()?),
            targets: PlatformManifest::new(manifest.names()).build_targets_for(platform),
            verbose,
        };
        packager = packager.with_build(Builder::new(build_config, runner), args.configuration);
    }
    packager.package(&layout.dist_dir(), &layout.out_dir(args.configuration), platform)
}

/// Upload the packaged archives and their checksums to a draft release.
///
/// Every archive is checked for existence before the release API is
/// contacted.
///
/// # Errors
///
/// Returns [`ReleaseError::MissingArtifact`] when an archive has not been
/// packaged, or the first publishing failure.
pub fn run_upload(
    args: &UploadArgs,
    layout: &SourceLayout,
    api: &dyn ReleaseApi,
    notes: &dyn ReleaseNotes,
) -> Result<UploadReport> {
    let manifest = BuildManifest::load(&layout.manifest())?;
    let (platform, config) = packager_config(layout, &manifest, &args.target)?;
    let archives: Vec<Utf8PathBuf> = config
        .expected_output(platform)
        .archives()
        .map(ToOwned::to_owned)
        .collect();
    if let Some(missing) = archives.iter().find(|archive| !archive.is_file()) {
        return Err(ReleaseError::MissingArtifact {
            path: missing.clone(),
        });
    }

    let tag = args
        .tag
        .clone()
        .unwrap_or_else(|| manifest.version().as_str().to_owned());
    let publisher = ReleasePublisher::new(api, manifest.names().project.as_str(), notes);
    let mut draft = publisher.find_or_create_draft(&tag)?;
    for archive in &archives {
        publisher.upload_with_checksum(&mut draft, archive)?;
    }
    if args.publish_release {
        publisher.publish(&draft)?;
    }

    Ok(UploadReport {
        release_name: draft.name.clone().unwrap_or_else(|| draft.tag_name.clone()),
        archives,
        published: args.publish_release,
    })
}

/// Run the ninja build for each requested configuration.
///
/// # Errors
///
/// Returns configuration failures or [`ReleaseError::BuildFailed`].
pub fn run_build(
    args: &BuildArgs,
    layout: &SourceLayout,
    verbose: bool,
    runner: &dyn CommandRunner,
) -> Result<()> {
    let manifest = BuildManifest::load(&layout.manifest())?;
    let host = Platform::current()?;
    let targets = match &args.target {
        Some(target) => vec![target.clone()],
        None => PlatformManifest::new(manifest.names()).build_targets_for(host),
    };
    let config = BuildConfig {
        layout: layout.clone(),
        ninja: layout.ninja(host),
        targets,
        verbose,
    };
    Builder::new(config, runner).build_all(&args.configuration)
}

/// Regenerate the framework version header from its template.
///
/// Returns the header path and whether it was rewritten.
///
/// # Errors
///
/// Returns configuration failures, a missing template, or I/O errors.
pub fn run_version_header(layout: &SourceLayout) -> Result<(Utf8PathBuf, bool)> {
    let manifest = BuildManifest::load(&layout.manifest())?;
    let header = layout.version_header();
    let written = update_version_header(
        &layout.version_header_template(),
        &header,
        &manifest.version(),
    )?;
    Ok((header, written))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
