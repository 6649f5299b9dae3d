//! Build manifest loading and source tree layout.
//!
//! The framework's build manifest lives at `meson.toml` in the source root:
//!
//! ```toml
//! [variables]
//! project_name = "meson"
//! product_name = "Meson"
//! version = "0.1.0"
//! ```
//!
//! Everything else the release tooling needs to locate is derived from the
//! source root by [`SourceLayout`].

use crate::error::{ReleaseError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use meson_common::{Platform, VersionString};
use serde::Deserialize;
use std::fmt;

/// File name of the build manifest in the source root.
pub const MANIFEST_FILE: &str = "meson.toml";

/// Prebuilt chromium download, relative to the source root.
const CHROMIUM_DOWNLOAD: &str = "vendor/brightray/vendor/download/libchromiumcontent";

#[derive(Debug, Deserialize)]
struct RawManifest {
    variables: Option<RawVariables>,
}

#[derive(Debug, Deserialize)]
struct RawVariables {
    project_name: Option<String>,
    product_name: Option<String>,
    version: Option<String>,
}

/// The project and product names used in file names and build targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNames {
    /// Lower-case project name, e.g. `meson`.
    pub project: String,
    /// Display product name, e.g. `Meson`.
    pub product: String,
}

impl ProjectNames {
    /// Create names from explicit values.
    #[must_use]
    pub fn new(project: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            product: product.into(),
        }
    }
}

/// The validated contents of the build manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest {
    names: ProjectNames,
    version: String,
}

impl BuildManifest {
    /// Load and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::Config`] if the file cannot be read, is not
    /// valid TOML, or lacks any of the required variables.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ReleaseError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &contents)
    }

    /// Parse manifest `contents`, attributing errors to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::Config`] if the contents are not valid TOML or
    /// lack a required variable.
    pub fn parse(path: &Utf8Path, contents: &str) -> Result<Self> {
        let config_error = |reason: String| ReleaseError::Config {
            path: path.to_owned(),
            reason,
        };
        let raw: RawManifest = toml::from_str(contents).map_err(|e| config_error(e.to_string()))?;
        let variables = raw
            .variables
            .ok_or_else(|| config_error("missing [variables] table".to_owned()))?;
        let require = |value: Option<String>, key: &str| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| config_error(format!("missing variables.{key}")))
        };

        Ok(Self {
            names: ProjectNames {
                project: require(variables.project_name, "project_name")?,
                product: require(variables.product_name, "product_name")?,
            },
            version: require(variables.version, "version")?,
        })
    }

    /// Return the project and product names.
    #[must_use]
    pub fn names(&self) -> &ProjectNames {
        &self.names
    }

    /// Resolve the release version: the manifest field prefixed with `v`.
    #[must_use]
    pub fn version(&self) -> VersionString {
        VersionString::from_manifest_field(&self.version)
    }
}

/// Build configuration selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Configuration {
    /// Optimised build.
    #[value(name = "Release", alias = "release")]
    Release,
    /// Debug build.
    #[value(name = "Debug", alias = "debug")]
    Debug,
}

impl Configuration {
    /// Name of the build directory under `out/`: the first letter.
    #[must_use]
    pub const fn out_dir_name(self) -> &'static str {
        match self {
            Self::Release => "R",
            Self::Debug => "D",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Release => "Release",
            Self::Debug => "Debug",
        })
    }
}

/// Well-known locations inside a framework checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    root: Utf8PathBuf,
}

impl SourceLayout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a layout rooted at `root`, resolved to an absolute canonical
    /// path so tools spawned in other directories still find it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `root` does not exist.
    pub fn resolve(root: &Utf8Path) -> Result<Self> {
        Ok(Self::new(root.canonicalize_utf8()?))
    }

    /// Create a layout rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the current directory cannot be read or is not
    /// valid UTF-8.
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = Utf8PathBuf::try_from(cwd).map_err(|e| ReleaseError::NonUtf8Path {
            path: e.into_path_buf().display().to_string(),
        })?;
        Ok(Self::new(root))
    }

    /// The source root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The build manifest.
    #[must_use]
    pub fn manifest(&self) -> Utf8PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// The build output directory for `configuration`.
    #[must_use]
    pub fn out_dir(&self, configuration: Configuration) -> Utf8PathBuf {
        self.root.join("out").join(configuration.out_dir_name())
    }

    /// The staging directory for distributable bundles.
    #[must_use]
    pub fn dist_dir(&self) -> Utf8PathBuf {
        self.root.join("dist")
    }

    /// The prebuilt chromium static library download.
    #[must_use]
    pub fn chromium_dir(&self) -> Utf8PathBuf {
        self.root.join(CHROMIUM_DOWNLOAD).join("static_library")
    }

    /// The chromium license bundle, beside the static library download.
    #[must_use]
    pub fn chromium_licenses(&self) -> Utf8PathBuf {
        self.root.join(CHROMIUM_DOWNLOAD).join("LICENSES.chromium.html")
    }

    /// The prebuilt media codec libraries, beside the static library download.
    #[must_use]
    pub fn ffmpeg_dir(&self) -> Utf8PathBuf {
        self.root.join(CHROMIUM_DOWNLOAD).join("ffmpeg")
    }

    /// The marker recording the target architecture of the chromium download.
    #[must_use]
    pub fn target_arch_marker(&self) -> Utf8PathBuf {
        self.root.join(CHROMIUM_DOWNLOAD).join(".target_arch")
    }

    /// The project license shipped in every archive.
    #[must_use]
    pub fn license(&self) -> Utf8PathBuf {
        self.root.join("LICENSE")
    }

    /// The ninja executable bundled with depot tools.
    #[must_use]
    pub fn ninja(&self, host: Platform) -> Utf8PathBuf {
        self.root
            .join("vendor/depot_tools")
            .join(format!("ninja{}", host.executable_suffix()))
    }

    /// The template for the framework version header.
    #[must_use]
    pub fn version_header_template(&self) -> Utf8PathBuf {
        self.root.join("script/meson_version_h.in")
    }

    /// The generated framework version header.
    #[must_use]
    pub fn version_header(&self) -> Utf8PathBuf {
        self.root.join("src/api/version.h")
    }
}
