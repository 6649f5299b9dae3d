//! Platform identifiers for distributable bundles.
//!
//! Every platform-conditional table in the release tooling is keyed by
//! [`Platform`]. Adding a platform means adding a variant here and filling in
//! the match arms the compiler then points at.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The platform identifiers accepted on the command line and in tables.
const SUPPORTED_PLATFORMS: &[&str] = &["darwin", "win32", "linux"];

/// Errors raised when a platform identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The identifier is not one of the fixed enumeration.
    #[error("unsupported platform \"{value}\"; expected one of: {expected}")]
    Unsupported {
        /// The rejected identifier.
        value: String,
        /// Comma-separated list of accepted identifiers.
        expected: String,
    },
}

/// A platform a distributable bundle can be produced for.
///
/// # Examples
///
/// ```
/// use meson_common::Platform;
///
/// let platform: Platform = "win32".parse().expect("known platform");
/// assert_eq!(platform.as_str(), "win32");
/// assert_eq!(platform.executable_suffix(), ".exe");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS.
    Darwin,
    /// Windows.
    Win32,
    /// Linux.
    Linux,
}

impl Platform {
    /// Every supported platform, in table order.
    pub const ALL: [Self; 3] = [Self::Darwin, Self::Win32, Self::Linux];

    /// Return the platform the tooling is running on.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] on hosts outside the fixed
    /// enumeration (for example FreeBSD).
    pub fn current() -> Result<Self, PlatformError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an operating system name onto a platform.
    ///
    /// Accepts Rust's `std::env::consts::OS` spellings as well as the
    /// platform identifiers themselves and the legacy `cygwin`/`linux2`
    /// aliases.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] when `os` is not recognised.
    pub fn from_os(os: &str) -> Result<Self, PlatformError> {
        match os {
            "macos" => Ok(Self::Darwin),
            "windows" | "cygwin" => Ok(Self::Win32),
            "linux2" => Ok(Self::Linux),
            other => other.parse(),
        }
    }

    /// Return the identifier used in tables and artefact names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
            Self::Linux => "linux",
        }
    }

    /// Return the suffix appended to executable names.
    #[must_use]
    pub const fn executable_suffix(self) -> &'static str {
        match self {
            Self::Win32 => ".exe",
            Self::Darwin | Self::Linux => "",
        }
    }

    /// Whether bundle directories on this platform contain symlinks that must
    /// survive archiving bit-for-bit.
    ///
    /// macOS frameworks rely on `Versions/Current` style links.
    #[must_use]
    pub const fn preserves_symlinks(self) -> bool {
        matches!(self, Self::Darwin)
    }

    /// Return the accepted platform identifiers.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_PLATFORMS
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "darwin" => Ok(Self::Darwin),
            "win32" => Ok(Self::Win32),
            "linux" => Ok(Self::Linux),
            other => Err(PlatformError::Unsupported {
                value: other.to_owned(),
                expected: SUPPORTED_PLATFORMS.join(", "),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::darwin("darwin", Platform::Darwin)]
    #[case::win32("win32", Platform::Win32)]
    #[case::linux("linux", Platform::Linux)]
    fn parses_supported_identifiers(#[case] raw: &str, #[case] expected: Platform) {
        let parsed: Platform = raw.parse().expect("supported identifier");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), raw);
    }

    #[test]
    fn rejects_unknown_identifier_and_names_it() {
        let err = "freebsd".parse::<Platform>().expect_err("freebsd is unsupported");
        let PlatformError::Unsupported { value, expected } = &err;
        assert_eq!(value, "freebsd");
        assert!(expected.contains("darwin"));
        assert!(err.to_string().contains("freebsd"));
    }

    #[rstest]
    #[case::macos("macos", Platform::Darwin)]
    #[case::windows("windows", Platform::Win32)]
    #[case::cygwin("cygwin", Platform::Win32)]
    #[case::linux("linux", Platform::Linux)]
    #[case::linux2("linux2", Platform::Linux)]
    fn maps_operating_system_names(#[case] os: &str, #[case] expected: Platform) {
        assert_eq!(Platform::from_os(os).expect("known os"), expected);
    }

    #[test]
    fn only_darwin_requires_symlink_fidelity() {
        let preserving: Vec<_> = Platform::ALL
            .into_iter()
            .filter(|p| p.preserves_symlinks())
            .collect();
        assert_eq!(preserving, vec![Platform::Darwin]);
    }

    #[test]
    fn current_platform_is_supported_on_ci_hosts() {
        #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
        assert!(Platform::current().is_ok());
    }
}
