//! User-facing progress messages.
//!
//! Messages go to stderr so stdout stays free for tooling. They are separate
//! from logging: `--quiet` suppresses them, `-v` does not add to them.

use crate::packager::PackageOutput;
use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;

/// Write `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; a closed stderr must not abort the run.
    }
}

/// Summarise a packaging run.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use meson_release::output::packaged_message;
/// use meson_release::packager::PackageOutput;
///
/// let output = PackageOutput {
///     archive: Utf8PathBuf::from("dist/meson-v0.1.0-linux-x64.zip"),
///     auxiliary: vec![Utf8PathBuf::from("dist/ffmpeg-v0.1.0-linux-x64.zip")],
/// };
/// assert!(packaged_message(&output).starts_with("Packaged 2 archives"));
/// ```
#[must_use]
pub fn packaged_message(output: &PackageOutput) -> String {
    let archives: Vec<String> = output.archives().map(|a| format!("  {a}")).collect();
    let count = archives.len();
    let plural = if count == 1 { "archive" } else { "archives" };
    format!("Packaged {count} {plural}:\n{}", archives.join("\n"))
}

/// Report an uploaded archive.
#[must_use]
pub fn uploaded_message(archive: &Utf8Path, release_name: &str) -> String {
    let name = archive.file_name().unwrap_or(archive.as_str());
    format!("Uploaded {name} (with checksum) to {release_name}")
}

/// Report the outcome of regenerating the version header.
#[must_use]
pub fn header_message(path: &Utf8Path, written: bool) -> String {
    if written {
        format!("Updated {path}")
    } else {
        format!("{path} is up to date")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn single_archive_is_singular() {
        let output = PackageOutput {
            archive: Utf8PathBuf::from("dist/meson.zip"),
            auxiliary: Vec::new(),
        };
        assert_eq!(packaged_message(&output), "Packaged 1 archive:\n  dist/meson.zip");
    }

    #[test]
    fn upload_message_uses_file_name() {
        let msg = uploaded_message(Utf8Path::new("/src/dist/meson.zip"), "meson v0.1.0");
        assert_eq!(msg, "Uploaded meson.zip (with checksum) to meson v0.1.0");
    }

    #[test]
    fn header_message_reflects_write() {
        let path = Utf8Path::new("src/api/version.h");
        assert_eq!(header_message(path, true), "Updated src/api/version.h");
        assert_eq!(header_message(path, false), "src/api/version.h is up to date");
    }

    #[test]
    fn closed_stderr_is_ignored() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        write_stderr_line(&mut Closed, "message");
    }
}
