//! Shared helpers for the meson release tooling.
//!
//! Everything here is free of I/O side effects except reading the target
//! architecture marker and the process environment, so both the packaging and
//! the publishing halves of `meson-release` can lean on it.
//!
//! # Modules
//!
//! - [`arch`] - Target and host architecture tokens
//! - [`env`] - Environment signals read at call time
//! - [`platform`] - The fixed platform enumeration
//! - [`version`] - Version strings and their four-component form

pub mod arch;
pub mod env;
pub mod platform;
pub mod version;

pub use arch::{TargetArch, host_arch};
pub use platform::{Platform, PlatformError};
pub use version::{VersionComponents, VersionString, parse_version};
