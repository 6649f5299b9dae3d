//! SHA-256 checksums for uploaded archives.
//!
//! Every archive is published alongside a `{archive}.sha256sum` sidecar that
//! holds the lowercase hex digest and nothing else.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;

/// Extension appended to an archive path to name its checksum sidecar.
pub const CHECKSUM_EXTENSION: &str = "sha256sum";

/// A hex-encoded SHA-256 digest: 64 lowercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The result of signing an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedArtefact {
    /// Path of the written sidecar.
    pub checksum_path: Utf8PathBuf,
    /// Digest of the archive contents.
    pub digest: Sha256Digest,
}

/// Compute the SHA-256 digest of the file at `path`, streaming its contents.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<Sha256Digest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(Sha256Digest::from_hasher(hasher))
}

/// Return the sidecar path for `path`: `{path}.sha256sum`.
#[must_use]
pub fn checksum_path_for(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}.{CHECKSUM_EXTENSION}"))
}

/// Digest `path` and write the digest to its sidecar.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or the sidecar cannot be
/// written.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use meson_release::artefact::checksum::sign;
///
/// let signed = sign(Utf8Path::new("dist/meson-v0.1.0-linux-x64.zip"))?;
/// assert!(signed.checksum_path.as_str().ends_with(".zip.sha256sum"));
/// # Ok::<(), meson_release::error::ReleaseError>(())
/// ```
pub fn sign(path: &Utf8Path) -> Result<SignedArtefact> {
    let digest = compute_sha256(path)?;
    let checksum_path = checksum_path_for(path);
    fs::write(&checksum_path, digest.as_str())?;
    Ok(SignedArtefact {
        checksum_path,
        digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 temp path");
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[rstest]
    fn digest_of_empty_file_is_well_known(temp: TempDir) {
        let path = write(&temp, "empty.zip", b"");
        assert_eq!(
            compute_sha256(&path).expect("digest").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[rstest]
    fn sign_writes_lowercase_hex_sidecar(temp: TempDir) {
        let path = write(&temp, "meson-v0.1.0-linux-x64.zip", b"bundle bytes");
        let signed = sign(&path).expect("sign");

        assert_eq!(signed.checksum_path, checksum_path_for(&path));
        assert!(signed.checksum_path.as_str().ends_with(".zip.sha256sum"));
        let digest = signed.digest.as_str();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert_eq!(
            fs::read_to_string(&signed.checksum_path).expect("read sidecar"),
            digest
        );
    }

    #[rstest]
    fn digest_is_content_addressed(temp: TempDir) {
        let a = write(&temp, "a.zip", b"same");
        let b = write(&temp, "b.zip", b"same");
        let c = write(&temp, "c.zip", b"different");
        let digest_a = compute_sha256(&a).expect("digest a");
        assert_eq!(digest_a, compute_sha256(&b).expect("digest b"));
        assert_ne!(digest_a, compute_sha256(&c).expect("digest c"));
    }

    #[rstest]
    fn digest_spans_multiple_buffers(temp: TempDir) {
        let large = vec![0x5a_u8; 8192 * 3 + 17];
        let path = write(&temp, "large.zip", &large);
        let expected = format!("{:x}", Sha256::digest(&large));
        assert_eq!(compute_sha256(&path).expect("digest").as_str(), expected);
    }
}
