//! Artefact naming policy for distributable zip archives.
//!
//! Archives are named `{name}-{version}-{platform_key}-{arch}[-{suffix}].zip`.
//! The same inputs always produce the same name, which is what makes
//! re-uploading (and replacing) an asset safe.

use meson_common::Platform;
use meson_common::env::is_restricted_distribution;
use std::fmt;

/// The fixed file extension for distributable archives.
const ARCHIVE_EXTENSION: &str = ".zip";

/// Platform key used for curated-store builds.
pub const RESTRICTED_PLATFORM_KEY: &str = "mas";

/// A fully-qualified archive name.
///
/// # Examples
///
/// ```
/// use meson_release::artefact::naming::ArtefactName;
///
/// let name = ArtefactName::new("meson", "v0.1.0", "linux", "arm");
/// assert_eq!(name.to_string(), "meson-v0.1.0-linux-armv7l.zip");
///
/// let symbols = name.with_suffix("symbols");
/// assert_eq!(symbols.to_string(), "meson-v0.1.0-linux-armv7l-symbols.zip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactName {
    name: String,
    version: String,
    platform_key: String,
    arch: String,
    suffix: Option<String>,
}

impl ArtefactName {
    /// Create an archive name without a suffix.
    ///
    /// The 32-bit ARM token `arm` is rewritten to `armv7l`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        platform_key: impl Into<String>,
        arch: &str,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform_key: platform_key.into(),
            arch: normalise_arch(arch).to_owned(),
            suffix: None,
        }
    }

    /// Return a copy carrying `suffix`. An empty suffix is the same as none.
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = (!suffix.is_empty()).then(|| suffix.to_owned());
        self
    }

    /// Return the architecture token as it appears in the file name.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Return the platform key as it appears in the file name.
    #[must_use]
    pub fn platform_key(&self) -> &str {
        &self.platform_key
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtefactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.name, self.version, self.platform_key, self.arch
        )?;
        if let Some(suffix) = &self.suffix {
            write!(f, "-{suffix}")?;
        }
        f.write_str(ARCHIVE_EXTENSION)
    }
}

/// Build an archive file name in one call.
///
/// # Examples
///
/// ```
/// use meson_release::artefact::naming::artefact_name;
///
/// assert_eq!(
///     artefact_name("foo", "v1.0.0", "linux", "x64", "symbols"),
///     "foo-v1.0.0-linux-x64-symbols.zip"
/// );
/// ```
#[must_use]
pub fn artefact_name(name: &str, version: &str, platform_key: &str, arch: &str, suffix: &str) -> String {
    ArtefactName::new(name, version, platform_key, arch)
        .with_suffix(suffix)
        .filename()
}

/// Return the architecture token used in file names.
#[must_use]
pub fn normalise_arch(arch: &str) -> &str {
    if arch == "arm" { "armv7l" } else { arch }
}

/// Return the platform key for `platform`.
///
/// When the restricted-distribution signal is present the key is
/// [`RESTRICTED_PLATFORM_KEY`] whatever the platform. The environment is read
/// on every call.
#[must_use]
pub fn platform_key(platform: Platform) -> String {
    if is_restricted_distribution() {
        RESTRICTED_PLATFORM_KEY.to_owned()
    } else {
        platform.as_str().to_owned()
    }
}
