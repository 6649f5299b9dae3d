//! Distributable bundle assembly.
//!
//! [`Packager::package`] runs the whole pipeline: reset the staging directory,
//! optionally run the release build, stage binaries, directories, prebuilt
//! tools, licenses and the version marker, then write the main archive and the
//! auxiliary codec archive.
//!
//! Packaging is not transactional. A failure part-way leaves a partially
//! populated staging directory; the recovery path is to run again from the
//! top, which starts by clearing it.

use crate::artefact::archive::{ArchiveRequest, ArchiveStrategy, make_zip};
use crate::artefact::manifest::{
    CHROMIUM_LICENSES, PROJECT_LICENSE, PlatformManifest, VERSION_FILE, ffmpeg_library_for,
    tool_binaries_for,
};
use crate::artefact::naming::{ArtefactName, platform_key};
use crate::build::Builder;
use crate::config::{Configuration, ProjectNames, SourceLayout};
use crate::error::{ReleaseError, Result};
use crate::runner::{CommandRunner, command_line, exit_code_of};
use crate::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use meson_common::{Platform, TargetArch, VersionString};

/// Name used for the standalone codec archive.
pub const FFMPEG_ARCHIVE_NAME: &str = "ffmpeg";

/// Inputs that stay fixed for a packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerConfig {
    /// Project and product names.
    pub names: ProjectNames,
    /// Resolved release version.
    pub version: VersionString,
    /// Target architecture of the build.
    pub arch: TargetArch,
    /// Prebuilt chromium directory holding `chromedriver` and `mksnapshot`.
    pub chromium_dir: Utf8PathBuf,
    /// The chromium license bundle.
    pub chromium_licenses: Utf8PathBuf,
    /// Directory holding the prebuilt codec libraries.
    pub ffmpeg_dir: Utf8PathBuf,
    /// The project license.
    pub project_license: Utf8PathBuf,
    /// Directory the archives are written to.
    pub archive_dir: Utf8PathBuf,
}

impl PackagerConfig {
    /// Derive every input location from `layout`. Archives are written to
    /// the distribution directory.
    #[must_use]
    pub fn for_layout(
        layout: &SourceLayout,
        names: ProjectNames,
        version: VersionString,
        arch: TargetArch,
    ) -> Self {
        Self {
            names,
            version,
            arch,
            chromium_dir: layout.chromium_dir(),
            chromium_licenses: layout.chromium_licenses(),
            ffmpeg_dir: layout.ffmpeg_dir(),
            project_license: layout.license(),
            archive_dir: layout.dist_dir(),
        }
    }

    /// Path of the archive for `name` on `platform`.
    ///
    /// The platform key is read from the environment on every call.
    #[must_use]
    pub fn archive_path(&self, name: &str, platform: Platform) -> Utf8PathBuf {
        let file_name = ArtefactName::new(
            name,
            self.version.as_str(),
            platform_key(platform),
            self.arch.as_str(),
        );
        self.archive_dir.join(file_name.filename())
    }

    /// The archives a packaging run for `platform` produces.
    #[must_use]
    pub fn expected_output(&self, platform: Platform) -> PackageOutput {
        PackageOutput {
            archive: self.archive_path(&self.names.project, platform),
            auxiliary: vec![self.archive_path(FFMPEG_ARCHIVE_NAME, platform)],
        }
    }
}

/// Archives produced by a packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutput {
    /// The main distributable archive.
    pub archive: Utf8PathBuf,
    /// Auxiliary archives, such as the codec library archive.
    pub auxiliary: Vec<Utf8PathBuf>,
}

impl PackageOutput {
    /// Every archive produced, main archive first.
    pub fn archives(&self) -> impl Iterator<Item = &Utf8Path> {
        std::iter::once(self.archive.as_path()).chain(self.auxiliary.iter().map(Utf8PathBuf::as_path))
    }
}

/// Assembles distributable bundles.
pub struct Packager<'a> {
    config: PackagerConfig,
    runner: &'a dyn CommandRunner,
    build: Option<(Builder<'a>, Configuration)>,
}

impl<'a> Packager<'a> {
    /// Create a packager that skips the release build.
    #[must_use]
    pub fn new(config: PackagerConfig, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            runner,
            build: None,
        }
    }

    /// Run `builder` for `configuration` before staging.
    #[must_use]
    pub fn with_build(mut self, builder: Builder<'a>, configuration: Configuration) -> Self {
        self.build = Some((builder, configuration));
        self
    }

    /// Build, stage, and archive a bundle for `platform`.
    ///
    /// Binaries and directories are taken from `out_dir`; the bundle is
    /// assembled in `staging_dir`, which is cleared first.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::BuildFailed`] if the release build fails,
    /// [`ReleaseError::MissingArtifact`] naming the first missing input,
    /// [`ReleaseError::CommandFailed`] if the archiver or stripper fails, or
    /// an I/O or zip error.
    pub fn package(
        &self,
        staging_dir: &Utf8Path,
        out_dir: &Utf8Path,
        platform: Platform,
    ) -> Result<PackageOutput> {
        let stager = Stager::new(staging_dir);
        stager.reset()?;

        if let Some((builder, configuration)) = &self.build {
            builder.build(*configuration)?;
        }

        let manifest = PlatformManifest::new(&self.config.names);
        let binaries = manifest.binaries_for(platform);
        let directories = manifest.directories_for(platform);

        info!("staging {} bundle in {staging_dir}", platform);
        for binary in &binaries {
            stager.copy_file(&out_dir.join(binary))?;
        }
        for directory in &directories {
            stager.copy_tree(&out_dir.join(directory))?;
        }
        for tool in tool_binaries_for(platform) {
            stager.copy_executable(&self.config.chromium_dir.join(tool))?;
        }
        self.copy_licenses(&stager)?;
        stager.write_file(VERSION_FILE, self.config.version.as_str())?;

        std::fs::create_dir_all(&self.config.archive_dir)?;
        let output = self.config.expected_output(platform);
        let mut files = binaries;
        files.extend(PlatformManifest::extra_files().map(str::to_owned));
        self.zip(platform, staging_dir, &files, &directories, &output.archive)?;

        for codec_archive in &output.auxiliary {
            self.package_ffmpeg(&stager, platform, codec_archive)?;
        }
        Ok(output)
    }

    fn copy_licenses(&self, stager: &Stager) -> Result<()> {
        stager.copy_file(&self.config.chromium_licenses)?;
        stager.copy_file(&self.config.project_license)?;
        Ok(())
    }

    fn package_ffmpeg(&self, stager: &Stager, platform: Platform, archive: &Utf8Path) -> Result<()> {
        let library = ffmpeg_library_for(platform);
        let staged = stager.copy_file(&self.config.ffmpeg_dir.join(library))?;
        if platform == Platform::Linux {
            self.strip(&staged, stager.root())?;
        }

        let files = [library, PROJECT_LICENSE, CHROMIUM_LICENSES].map(str::to_owned);
        self.zip(platform, stager.root(), &files, &[], archive)
    }

    fn strip(&self, binary: &Utf8Path, cwd: &Utf8Path) -> Result<()> {
        let tool = strip_tool_for(&self.config.arch);
        let args = [binary.as_str()];
        let output = self.runner.run(tool, &args, cwd)?;
        if output.status.success() {
            return Ok(());
        }
        Err(ReleaseError::CommandFailed {
            command: command_line(tool, &args),
            code: exit_code_of(output.status),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }

    fn zip(
        &self,
        platform: Platform,
        root: &Utf8Path,
        files: &[String],
        directories: &[String],
        output: &Utf8Path,
    ) -> Result<()> {
        let request = ArchiveRequest {
            root,
            files,
            directories,
            output,
        };
        make_zip(ArchiveStrategy::for_platform(platform), &request, self.runner)
    }
}

/// Return the stripper for binaries built for `arch`.
#[must_use]
pub fn strip_tool_for(arch: &TargetArch) -> &'static str {
    if arch.is_arm() {
        "arm-linux-gnueabihf-strip"
    } else {
        "strip"
    }
}

#[cfg(test)]
#[path = "packager_tests.rs"]
mod tests;
