//! Staging directory population.
//!
//! A [`Stager`] owns one staging directory for the duration of a packaging
//! run. [`Stager::reset`] must be called first: a partially populated staging
//! directory from an aborted run is never valid input.

use crate::error::{ReleaseError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Copies build outputs into a staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    root: Utf8PathBuf,
}

impl Stager {
    /// Create a stager for `root`. Nothing touches the disk until
    /// [`Stager::reset`].
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The staging directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Remove the staging directory if present and recreate it empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be removed or created.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Copy `source` into the staging root under its own file name,
    /// preserving permission bits.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::MissingArtifact`] naming `source` when it does
    /// not exist, or an I/O error if the copy fails.
    pub fn copy_file(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        if !source.is_file() {
            return Err(ReleaseError::MissingArtifact {
                path: source.to_owned(),
            });
        }
        let file_name = source.file_name().ok_or_else(|| ReleaseError::MissingArtifact {
            path: source.to_owned(),
        })?;
        let dest = self.root.join(file_name);
        debug!("staging {source} -> {dest}");
        fs::copy(source, &dest)?;
        Ok(dest)
    }

    /// Copy `source` into the staging root and add the owner execute bit.
    ///
    /// # Errors
    ///
    /// As [`Stager::copy_file`].
    pub fn copy_executable(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        let dest = self.copy_file(source)?;
        make_executable(&dest)?;
        Ok(dest)
    }

    /// Recursively copy the directory `source` into the staging root under
    /// its own name. Symlinks are recreated as links, not followed.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::MissingArtifact`] naming `source` when it is not
    /// a directory, or an I/O error if any entry cannot be copied.
    pub fn copy_tree(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        if !source.is_dir() {
            return Err(ReleaseError::MissingArtifact {
                path: source.to_owned(),
            });
        }
        let name = source.file_name().ok_or_else(|| ReleaseError::MissingArtifact {
            path: source.to_owned(),
        })?;
        let dest = self.root.join(name);
        debug!("staging tree {source} -> {dest}");

        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| ReleaseError::NonUtf8Path {
                    path: entry.path().display().to_string(),
                })?;
            let target = dest.as_std_path().join(relative);
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
        Ok(dest)
    }

    /// Write `contents` to `name` inside the staging root.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let dest = self.root.join(name);
        fs::write(&dest, contents)?;
        Ok(dest)
    }
}

#[cfg(unix)]
fn copy_symlink(link: &std::path::Path, target: &std::path::Path) -> Result<()> {
    let points_to = fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &std::path::Path, target: &std::path::Path) -> Result<()> {
    // Bundles that rely on links are only produced on macOS.
    if link.is_dir() {
        fs::create_dir_all(target)?;
    } else {
        fs::copy(link, target)?;
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o100);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> Result<()> {
    Ok(())
}
