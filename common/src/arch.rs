//! Target and host architecture tokens.
//!
//! The target architecture is recorded by the bootstrap step in a
//! `.target_arch` marker beside the prebuilt chromium download. When the marker
//! is absent the build targets `x64`.

use camino::Utf8Path;
use log::debug;
use std::fmt;
use std::io;

/// Architecture assumed when no marker file exists.
pub const DEFAULT_TARGET_ARCH: &str = "x64";

/// The architecture a bundle is built for, as written in the marker file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetArch(String);

impl TargetArch {
    /// Wrap an explicit architecture token such as `x64`, `ia32`, or `arm`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the architecture from `marker`, falling back to
    /// [`DEFAULT_TARGET_ARCH`] when the file does not exist or is blank.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than "not found" encountered while reading
    /// the marker.
    pub fn detect(marker: &Utf8Path) -> io::Result<Self> {
        match std::fs::read_to_string(marker) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Ok(Self::default())
                } else {
                    Ok(Self::new(trimmed))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no target arch marker at {marker}; assuming {DEFAULT_TARGET_ARCH}");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Return the raw architecture token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the 32-bit ARM target.
    #[must_use]
    pub fn is_arm(&self) -> bool {
        self.0 == "arm"
    }
}

impl Default for TargetArch {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ARCH)
    }
}

impl AsRef<str> for TargetArch {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return the host architecture in the build generator's vocabulary.
///
/// # Examples
///
/// ```
/// let arch = meson_common::host_arch();
/// assert!(!arch.is_empty());
/// ```
#[must_use]
pub fn host_arch() -> String {
    normalise_machine(std::env::consts::ARCH)
}

/// Normalise a machine name (`uname -m` or Rust's `ARCH` constant).
#[must_use]
pub fn normalise_machine(machine: &str) -> String {
    let is_x86_32 = matches!(machine, "x86" | "i86pc")
        || (machine.len() == 4
            && machine.starts_with('i')
            && machine.ends_with("86")
            && machine.chars().nth(1).is_some_and(|c| c.is_ascii_digit()));
    if is_x86_32 {
        "ia32".to_owned()
    } else if matches!(machine, "x86_64" | "amd64") {
        "x64".to_owned()
    } else if matches!(machine, "aarch64" | "arm64") {
        "arm64".to_owned()
    } else if machine.starts_with("arm") {
        "arm".to_owned()
    } else {
        machine.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    fn marker_in(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(".target_arch")).expect("utf-8 temp path")
    }

    #[test]
    fn detect_defaults_to_x64_when_marker_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let arch = TargetArch::detect(&marker_in(&dir)).expect("missing marker is fine");
        assert_eq!(arch.as_str(), "x64");
    }

    #[test]
    fn detect_reads_and_trims_marker() {
        let dir = tempfile::tempdir().expect("temp dir");
        let marker = marker_in(&dir);
        std::fs::write(&marker, "arm\n").expect("write marker");
        let arch = TargetArch::detect(&marker).expect("marker readable");
        assert_eq!(arch.as_str(), "arm");
        assert!(arch.is_arm());
    }

    #[test]
    fn detect_treats_blank_marker_as_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let marker = marker_in(&dir);
        std::fs::write(&marker, "  \n").expect("write marker");
        assert_eq!(TargetArch::detect(&marker).expect("readable"), TargetArch::default());
    }

    #[rstest]
    #[case::i386("i386", "ia32")]
    #[case::i686("i686", "ia32")]
    #[case::x86("x86", "ia32")]
    #[case::solaris("i86pc", "ia32")]
    #[case::x86_64("x86_64", "x64")]
    #[case::amd64("amd64", "x64")]
    #[case::armv7l("armv7l", "arm")]
    #[case::aarch64("aarch64", "arm64")]
    #[case::unknown("riscv64", "riscv64")]
    fn normalises_machine_names(#[case] machine: &str, #[case] expected: &str) {
        assert_eq!(normalise_machine(machine), expected);
    }
}
