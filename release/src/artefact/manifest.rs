//! Per-platform bundle contents.
//!
//! These tables are hand-maintained configuration, not computed. Each list is
//! ordered; archive entries follow the same order.

use crate::config::ProjectNames;
use meson_common::Platform;

/// License file shipped from the project root.
pub const PROJECT_LICENSE: &str = "LICENSE";

/// License file shipped from the chromium download.
pub const CHROMIUM_LICENSES: &str = "LICENSES.chromium.html";

/// Version marker written into every bundle.
pub const VERSION_FILE: &str = "version";

/// Prebuilt chromium tools copied next to the bundle.
const CHROMIUM_TOOLS: [&str; 2] = ["chromedriver", "mksnapshot"];

/// Resource packs and data files shared by the Windows and Linux bundles.
const SHARED_RESOURCES: [&str; 7] = [
    "content_shell.pak",
    "icudtl.dat",
    "blink_image_resources_200_percent.pak",
    "content_resources_200_percent.pak",
    "ui_resources_200_percent.pak",
    "views_resources_200_percent.pak",
    "natives_blob.bin",
];

/// Static bundle tables, specialised with the project and product names.
///
/// # Examples
///
/// ```
/// use meson_common::Platform;
/// use meson_release::artefact::manifest::PlatformManifest;
/// use meson_release::config::ProjectNames;
///
/// let names = ProjectNames::new("meson", "Meson");
/// let manifest = PlatformManifest::new(&names);
/// assert_eq!(manifest.binaries_for(Platform::Linux)[0], "libmeson.so");
/// assert_eq!(manifest.directories_for(Platform::Darwin)[0], "Meson.framework");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PlatformManifest<'a> {
    names: &'a ProjectNames,
}

impl<'a> PlatformManifest<'a> {
    /// Create the tables for `names`.
    #[must_use]
    pub fn new(names: &'a ProjectNames) -> Self {
        Self { names }
    }

    /// Files copied from the build output into the bundle root.
    ///
    /// Every entry must exist when packaging; on darwin that is only
    /// `libnode.dylib`, since the framework carries the rest.
    #[must_use]
    pub fn binaries_for(&self, platform: Platform) -> Vec<String> {
        let project = &self.names.project;
        match platform {
            Platform::Darwin => vec!["libnode.dylib".to_owned()],
            Platform::Win32 => {
                let mut binaries = vec![
                    format!("{project}.dll"),
                    "d3dcompiler_47.dll".to_owned(),
                    "libEGL.dll".to_owned(),
                    "libGLESv2.dll".to_owned(),
                    "ffmpeg.dll".to_owned(),
                    "xinput1_3.dll".to_owned(),
                ];
                binaries.extend(SHARED_RESOURCES.iter().map(|s| (*s).to_owned()));
                binaries.push("snapshot_blob.bin".to_owned());
                binaries
            }
            Platform::Linux => {
                let mut binaries = vec![
                    format!("lib{project}.so"),
                    "libffmpeg.so".to_owned(),
                    "libnode.so".to_owned(),
                ];
                binaries.extend(SHARED_RESOURCES.iter().map(|s| (*s).to_owned()));
                binaries.push("snapshot_blob.bin".to_owned());
                binaries
            }
        }
    }

    /// Directories copied recursively from the build output.
    #[must_use]
    pub fn directories_for(&self, platform: Platform) -> Vec<String> {
        let product = &self.names.product;
        match platform {
            Platform::Darwin => vec![
                format!("{product}.framework"),
                format!("{product} Helper.app"),
            ],
            Platform::Win32 | Platform::Linux => {
                vec!["resources".to_owned(), "locales".to_owned()]
            }
        }
    }

    /// Ninja targets that make up a release build.
    #[must_use]
    pub fn build_targets_for(&self, platform: Platform) -> Vec<String> {
        let product = &self.names.product;
        match platform {
            Platform::Darwin => vec![
                format!("{product}.framework"),
                format!("{product} Helper.app"),
            ],
            Platform::Win32 | Platform::Linux => vec![product.clone()],
        }
    }

    /// Files placed in the main archive besides the binaries: licenses and
    /// the version marker, in archive order.
    #[must_use]
    pub fn extra_files() -> [&'static str; 3] {
        [PROJECT_LICENSE, CHROMIUM_LICENSES, VERSION_FILE]
    }
}

/// Prebuilt chromium tools staged with the bundle, named for `platform`.
#[must_use]
pub fn tool_binaries_for(platform: Platform) -> Vec<String> {
    CHROMIUM_TOOLS
        .iter()
        .map(|tool| format!("{tool}{}", platform.executable_suffix()))
        .collect()
}

/// The standalone media codec library for `platform`.
#[must_use]
pub const fn ffmpeg_library_for(platform: Platform) -> &'static str {
    match platform {
        Platform::Darwin => "libffmpeg.dylib",
        Platform::Linux => "libffmpeg.so",
        Platform::Win32 => "ffmpeg.dll",
    }
}
