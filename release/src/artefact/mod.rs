//! Archive naming, bundle contents, archive writing, and checksums.
//!
//! # Sub-modules
//!
//! - [`archive`] - Zip construction with a per-platform strategy
//! - [`checksum`] - SHA-256 digests and `.sha256sum` sidecars
//! - [`manifest`] - Static per-platform bundle tables
//! - [`naming`] - Deterministic archive file names

pub mod archive;
pub mod checksum;
pub mod manifest;
pub mod naming;
