//! Version strings and their four-component numeric form.
//!
//! Releases are tagged `v<major>.<minor>.<patch>`. Resource compilers and the
//! generated version header want exactly four components, so
//! [`parse_version`] pads or truncates whatever it is given.

use std::fmt;

/// The marker prefixed to manifest versions to form a tag.
pub const VERSION_MARKER: char = 'v';

/// A resolved version string such as `v1.2.3`.
///
/// # Examples
///
/// ```
/// use meson_common::VersionString;
///
/// let version = VersionString::from_manifest_field("1.2.3");
/// assert_eq!(version.as_str(), "v1.2.3");
/// assert_eq!(version.components().as_array(), ["1", "2", "3", "0"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionString(String);

impl VersionString {
    /// Build the tag form from the bare `version` manifest field.
    #[must_use]
    pub fn from_manifest_field(raw: &str) -> Self {
        Self(format!("{VERSION_MARKER}{}", raw.trim()))
    }

    /// Wrap a version exactly as supplied, for example from `--version`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the four-component form of this version.
    #[must_use]
    pub fn components(&self) -> VersionComponents {
        parse_version(&self.0)
    }
}

impl AsRef<str> for VersionString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four dot-separated components of a version.
///
/// Components stay textual: the parser is best-effort and never rejects a
/// non-numeric component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionComponents {
    /// First component.
    pub major: String,
    /// Second component.
    pub minor: String,
    /// Third component.
    pub patch: String,
    /// Fourth component.
    pub build: String,
}

impl VersionComponents {
    /// Return the components in order.
    #[must_use]
    pub fn as_array(&self) -> [&str; 4] {
        [&self.major, &self.minor, &self.patch, &self.build]
    }
}

/// Split `version` into exactly four components.
///
/// A leading [`VERSION_MARKER`] is stripped. Missing trailing components are
/// filled with `"0"`; components beyond the fourth are dropped. The function
/// is total: malformed input yields a best-effort result, never an error.
///
/// # Examples
///
/// ```
/// use meson_common::parse_version;
///
/// assert_eq!(parse_version("1.2").as_array(), ["1", "2", "0", "0"]);
/// assert_eq!(parse_version("1.2.3.4.5").as_array(), ["1", "2", "3", "4"]);
/// assert_eq!(parse_version("v1.2.3").as_array(), ["1", "2", "3", "0"]);
/// ```
#[must_use]
pub fn parse_version(version: &str) -> VersionComponents {
    let bare = version.strip_prefix(VERSION_MARKER).unwrap_or(version);
    let mut parts = bare.split('.');
    let mut next = || parts.next().unwrap_or("0").to_owned();
    VersionComponents {
        major: next(),
        minor: next(),
        patch: next(),
        build: next(),
    }
}
