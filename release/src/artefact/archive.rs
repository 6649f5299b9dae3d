//! Zip archive construction.
//!
//! Two strategies produce the same conventional zip layout. Platforms whose
//! bundles hold meaningful symlinks (macOS frameworks) shell out to `zip -r -y`
//! so links are stored as links. Everywhere else the archive is written
//! in-process, entry by entry, with fixed timestamps so repeated runs are
//! byte-identical.

use crate::error::{ReleaseError, Result};
use crate::runner::{CommandRunner, command_line, exit_code_of};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use meson_common::Platform;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// External archiver used when symlinks must survive.
const ZIP_TOOL: &str = "zip";

/// How an archive is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStrategy {
    /// Shell out to `zip -r -y`, storing symlinks as links.
    External,
    /// Write entries in-process with deterministic metadata.
    InProcess,
}

impl ArchiveStrategy {
    /// Pick the strategy for bundles built on `platform`.
    #[must_use]
    pub const fn for_platform(platform: Platform) -> Self {
        if platform.preserves_symlinks() {
            Self::External
        } else {
            Self::InProcess
        }
    }
}

/// What to put in an archive and where to write it.
///
/// Entry names are relative to `root`. Files are stored first, in the given
/// order; then every regular file below each directory.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRequest<'a> {
    /// Directory the entry names are relative to.
    pub root: &'a Utf8Path,
    /// Top-level files to store.
    pub files: &'a [String],
    /// Directories whose contents are stored recursively.
    pub directories: &'a [String],
    /// Archive path to write.
    pub output: &'a Utf8Path,
}

/// Write the archive described by `request`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ReleaseError::MissingArtifact`] when a listed file or directory
/// does not exist, [`ReleaseError::CommandFailed`] when the external archiver
/// fails, or an I/O or zip error.
pub fn make_zip(
    strategy: ArchiveStrategy,
    request: &ArchiveRequest<'_>,
    runner: &dyn CommandRunner,
) -> Result<()> {
    remove_if_present(request.output)?;
    debug!("writing {} ({strategy:?})", request.output);
    match strategy {
        ArchiveStrategy::External => zip_with_tool(request, runner),
        ArchiveStrategy::InProcess => zip_in_process(request),
    }
}

fn remove_if_present(path: &Utf8Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn zip_with_tool(request: &ArchiveRequest<'_>, runner: &dyn CommandRunner) -> Result<()> {
    // The archiver runs inside `root`, so a relative output would land there.
    let output = absolute(request.output)?;
    let mut args = vec!["-r", "-y", output.as_str()];
    args.extend(request.files.iter().map(String::as_str));
    args.extend(request.directories.iter().map(String::as_str));

    let output = runner.run(ZIP_TOOL, &args, request.root)?;
    if output.status.success() {
        return Ok(());
    }
    Err(ReleaseError::CommandFailed {
        command: command_line(ZIP_TOOL, &args),
        code: exit_code_of(output.status),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = std::path::absolute(path)?;
    Utf8PathBuf::from_path_buf(path).map_err(|path| ReleaseError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn zip_in_process(request: &ArchiveRequest<'_>) -> Result<()> {
    let mut zip = ZipWriter::new(fs::File::create(request.output)?);

    for name in request.files {
        let path = request.root.join(name);
        if !path.is_file() {
            return Err(ReleaseError::MissingArtifact { path });
        }
        append_file(&mut zip, path.as_std_path(), name)?;
    }

    for directory in request.directories {
        let dir = request.root.join(directory);
        if !dir.is_dir() {
            return Err(ReleaseError::MissingArtifact { path: dir });
        }
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            // Symlinked files are stored with their target's contents;
            // symlinked directories are not descended into.
            if !entry.path().is_file() {
                continue;
            }
            let name = entry_name(request.root.as_std_path(), entry.path())?;
            append_file(&mut zip, entry.path(), &name)?;
        }
    }

    zip.finish()?;
    Ok(())
}

fn append_file(zip: &mut ZipWriter<fs::File>, path: &Path, name: &str) -> Result<()> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(file_mode(path)?);
    zip.start_file(name, options)?;
    let mut input = fs::File::open(path)?;
    io::copy(&mut input, zip)?;
    Ok(())
}

/// Build a forward-slash entry name for `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| ReleaseError::NonUtf8Path {
                    path: path.display().to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn file_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;

    Ok(fs::metadata(path)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(path: &Path) -> Result<u32> {
    let readonly = fs::metadata(path)?.permissions().readonly();
    Ok(if readonly { 0o444 } else { 0o644 })
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
