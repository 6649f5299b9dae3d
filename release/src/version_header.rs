//! Framework version header generation.
//!
//! The header template carries `{PLACEHOLDER_VERSION_MAJOR}`,
//! `{PLACEHOLDER_VERSION_MINOR}` and `{PLACEHOLDER_VERSION_REVISION}`. The
//! output is rewritten only when its content would change, so incremental
//! builds that depend on the header are not invalidated needlessly.

use crate::error::{ReleaseError, Result};
use camino::Utf8Path;
use log::debug;
use meson_common::VersionString;
use std::fs;

const MAJOR: &str = "{PLACEHOLDER_VERSION_MAJOR}";
const MINOR: &str = "{PLACEHOLDER_VERSION_MINOR}";
const REVISION: &str = "{PLACEHOLDER_VERSION_REVISION}";

/// Substitute the version placeholders in `template`.
///
/// # Examples
///
/// ```
/// use meson_common::VersionString;
/// use meson_release::version_header::render_version_header;
///
/// let header = render_version_header(
///     "#define MAJOR {PLACEHOLDER_VERSION_MAJOR}",
///     &VersionString::new("v2.1"),
/// );
/// assert_eq!(header, "#define MAJOR 2");
/// ```
#[must_use]
pub fn render_version_header(template: &str, version: &VersionString) -> String {
    let components = version.components();
    template
        .replace(MAJOR, &components.major)
        .replace(MINOR, &components.minor)
        .replace(REVISION, &components.patch)
}

/// Render `template_path` for `version` into `output_path`.
///
/// Returns whether the output file was written.
///
/// # Errors
///
/// Returns [`ReleaseError::MissingArtifact`] if the template is absent, or an
/// I/O error if the output cannot be read or written.
pub fn update_version_header(
    template_path: &Utf8Path,
    output_path: &Utf8Path,
    version: &VersionString,
) -> Result<bool> {
    if !template_path.is_file() {
        return Err(ReleaseError::MissingArtifact {
            path: template_path.to_owned(),
        });
    }
    let content = render_version_header(&fs::read_to_string(template_path)?, version);
    if output_path.is_file() && fs::read_to_string(output_path)? == content {
        debug!("{output_path} is up to date");
        return Ok(false);
    }
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, content)?;
    Ok(true)
}
