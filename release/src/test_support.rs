//! Test doubles shared by unit and integration tests.
//!
//! Available under `cfg(test)` and the `test-support` feature.

use crate::config::{ProjectNames, SourceLayout};
use crate::error::{ReleaseError, Result};
use crate::packager::PackagerConfig;
use crate::publish::PublishError;
use crate::publish::api::{Asset, NewRelease, Release, ReleaseApi};
use crate::runner::{CommandRunner, command_line};
use camino::{Utf8Path, Utf8PathBuf};
use meson_common::{Platform, TargetArch, VersionString};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::process::{ExitStatus, Output};
use tempfile::TempDir;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
#[expect(clippy::cast_sign_loss, reason = "exit codes in tests are small and non-negative")]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// An expected command invocation and the response to give.
#[derive(Debug, Clone)]
pub struct ExpectedCall {
    cmd: String,
    args: Option<Vec<String>>,
    exit_code: i32,
    stderr: String,
    writes: Option<String>,
}

impl ExpectedCall {
    /// Expect `cmd` with exactly `args`; succeed by default.
    #[must_use]
    pub fn new(cmd: impl Into<String>, args: &[&str]) -> Self {
        Self {
            cmd: cmd.into(),
            args: Some(args.iter().map(|a| (*a).to_owned()).collect()),
            exit_code: 0,
            stderr: String::new(),
            writes: None,
        }
    }

    /// Expect `cmd` with any arguments.
    #[must_use]
    pub fn any_args(cmd: impl Into<String>) -> Self {
        Self {
            args: None,
            ..Self::new(cmd, &[])
        }
    }

    /// Respond with `code` instead of success.
    #[must_use]
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Respond with `stderr` as captured standard error.
    #[must_use]
    pub fn stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Overwrite the file named by the last argument with `contents`, the
    /// way an editor would.
    #[must_use]
    pub fn writes(mut self, contents: impl Into<String>) -> Self {
        self.writes = Some(contents.into());
        self
    }
}

/// A `CommandRunner` that replays an expected sequence of invocations.
///
/// Mismatches are reported as [`ReleaseError::StubMismatch`].
#[derive(Debug, Default)]
pub struct StubRunner {
    expected: RefCell<VecDeque<ExpectedCall>>,
    seen: RefCell<Vec<String>>,
}

impl StubRunner {
    /// Creates a runner expecting `expected`, in order.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            seen: RefCell::default(),
        }
    }

    /// Every command line received so far.
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations, {} remain",
            self.expected.borrow().len()
        );
    }

    fn respond(&self, cmd: &str, args: &[&str]) -> Result<ExpectedCall> {
        self.seen.borrow_mut().push(command_line(cmd, args));
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ReleaseError::StubMismatch {
                message: format!("unexpected invocation: {}", command_line(cmd, args)),
            })?;
        let args_match = call
            .args
            .as_ref()
            .is_none_or(|expected| expected.iter().map(String::as_str).eq(args.iter().copied()));
        if call.cmd != cmd || !args_match {
            return Err(ReleaseError::StubMismatch {
                message: format!(
                    "expected {} {:?}, got {}",
                    call.cmd,
                    call.args,
                    command_line(cmd, args)
                ),
            });
        }
        if let (Some(contents), Some(path)) = (&call.writes, args.last()) {
            fs::write(path, contents)?;
        }
        Ok(call)
    }
}

impl CommandRunner for StubRunner {
    fn run<'a>(&self, cmd: &str, args: &[&'a str], _cwd: &Utf8Path) -> Result<Output> {
        let call = self.respond(cmd, args)?;
        Ok(Output {
            status: exit_status(call.exit_code),
            stdout: Vec::new(),
            stderr: call.stderr.into_bytes(),
        })
    }

    fn run_inherited<'a>(&self, cmd: &str, args: &[&'a str], _cwd: &Utf8Path) -> Result<ExitStatus> {
        let call = self.respond(cmd, args)?;
        Ok(exit_status(call.exit_code))
    }
}

#[derive(Debug, Default)]
struct ApiState {
    releases: Vec<Release>,
    next_id: u64,
    created: usize,
    deleted: Vec<u64>,
    uploads: Vec<(String, String)>,
    list_calls: usize,
    fail_deletes: bool,
    fail_uploads: Option<u16>,
}

impl ApiState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A `ReleaseApi` holding releases in memory.
#[derive(Debug, Default)]
pub struct InMemoryReleaseApi {
    state: RefCell<ApiState>,
}

impl InMemoryReleaseApi {
    /// An API with no releases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing release with the given tag.
    #[must_use]
    pub fn with_release(self, tag: &str, draft: bool) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = state.allocate_id();
            state.releases.push(Release {
                id,
                tag_name: tag.to_owned(),
                name: Some(tag.to_owned()),
                draft,
                assets: Vec::new(),
            });
        }
        self
    }

    /// Make every asset deletion fail.
    #[must_use]
    pub fn failing_deletes(self) -> Self {
        self.state.borrow_mut().fail_deletes = true;
        self
    }

    /// Make every upload fail with HTTP `status`.
    #[must_use]
    pub fn failing_uploads(self, status: u16) -> Self {
        self.state.borrow_mut().fail_uploads = Some(status);
        self
    }

    /// Snapshot of the stored releases.
    #[must_use]
    pub fn releases(&self) -> Vec<Release> {
        self.state.borrow().releases.clone()
    }

    /// Number of releases created through the API.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.state.borrow().created
    }

    /// Number of list calls made.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state.borrow().list_calls
    }

    /// Ids of deleted assets, in order.
    #[must_use]
    pub fn deleted(&self) -> Vec<u64> {
        self.state.borrow().deleted.clone()
    }

    /// `(name, content type)` of every upload, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.state.borrow().uploads.clone()
    }

    fn not_found(url: String) -> PublishError {
        PublishError::Http {
            method: "GET",
            url,
            status: 404,
            body: "Not Found".to_owned(),
        }
    }
}

impl ReleaseApi for InMemoryReleaseApi {
    fn list_releases(&self) -> std::result::Result<Vec<Release>, PublishError> {
        let mut state = self.state.borrow_mut();
        state.list_calls += 1;
        Ok(state.releases.clone())
    }

    fn create_release(&self, release: &NewRelease) -> std::result::Result<Release, PublishError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        let created = Release {
            id,
            tag_name: release.tag_name.clone(),
            name: Some(release.name.clone()),
            draft: release.draft,
            assets: Vec::new(),
        };
        state.created += 1;
        state.releases.push(created.clone());
        Ok(created)
    }

    fn delete_asset(&self, asset_id: u64) -> std::result::Result<(), PublishError> {
        let mut state = self.state.borrow_mut();
        if state.fail_deletes {
            return Err(PublishError::Http {
                method: "DELETE",
                url: format!("memory://assets/{asset_id}"),
                status: 500,
                body: "delete refused".to_owned(),
            });
        }
        let mut found = false;
        for release in &mut state.releases {
            let before = release.assets.len();
            release.assets.retain(|asset| asset.id != asset_id);
            found |= release.assets.len() != before;
        }
        if !found {
            return Err(Self::not_found(format!("memory://assets/{asset_id}")));
        }
        state.deleted.push(asset_id);
        Ok(())
    }

    fn upload_asset(
        &self,
        release_id: u64,
        name: &str,
        _content: &[u8],
        content_type: &str,
    ) -> std::result::Result<Asset, PublishError> {
        let mut state = self.state.borrow_mut();
        if let Some(status) = state.fail_uploads {
            return Err(PublishError::Http {
                method: "POST",
                url: format!("memory://releases/{release_id}/assets?name={name}"),
                status,
                body: "upload refused".to_owned(),
            });
        }
        let id = state.allocate_id();
        let release = state
            .releases
            .iter_mut()
            .find(|release| release.id == release_id)
            .ok_or_else(|| Self::not_found(format!("memory://releases/{release_id}")))?;
        if release.asset_named(name).is_some() {
            return Err(PublishError::Http {
                method: "POST",
                url: format!("memory://releases/{release_id}/assets?name={name}"),
                status: 422,
                body: "already_exists".to_owned(),
            });
        }
        let asset = Asset {
            id,
            name: name.to_owned(),
        };
        release.assets.push(asset.clone());
        state.uploads.push((name.to_owned(), content_type.to_owned()));
        Ok(asset)
    }

    fn publish_release(&self, release_id: u64) -> std::result::Result<Release, PublishError> {
        let mut state = self.state.borrow_mut();
        let release = state
            .releases
            .iter_mut()
            .find(|release| release.id == release_id)
            .ok_or_else(|| Self::not_found(format!("memory://releases/{release_id}")))?;
        release.draft = false;
        Ok(release.clone())
    }
}

/// Express the absolute `path` relative to the current working directory.
///
/// # Errors
///
/// Returns an I/O error if the working directory cannot be read or `path`
/// is not absolute.
#[cfg(unix)]
pub fn relative_to_cwd(path: &Utf8Path) -> io::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    let tail = path.strip_prefix("/").map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{path} is not absolute"))
    })?;
    let mut relative = Utf8PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.push(tail);
    Ok(relative)
}

/// A throwaway framework checkout populated with every input packaging reads.
#[derive(Debug)]
pub struct FakeSourceTree {
    _temp: TempDir,
    layout: SourceLayout,
    names: ProjectNames,
}

impl FakeSourceTree {
    /// Create a checkout for `platform` with `meson`/`Meson` names and a
    /// manifest declaring `version`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the tree cannot be written.
    pub fn new(platform: Platform, version: &str) -> io::Result<Self> {
        let temp = tempfile::tempdir()?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).map_err(|path| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("non-UTF-8 temp path {}", path.display()),
            )
        })?;
        let tree = Self {
            _temp: temp,
            layout: SourceLayout::new(root),
            names: ProjectNames::new("meson", "Meson"),
        };
        tree.populate(platform, version)?;
        Ok(tree)
    }

    fn populate(&self, platform: Platform, version: &str) -> io::Result<()> {
        let layout = &self.layout;
        fs::write(
            layout.manifest(),
            format!(
                "[variables]\nproject_name = \"{}\"\nproduct_name = \"{}\"\nversion = \"{version}\"\n",
                self.names.project, self.names.product
            ),
        )?;
        fs::write(layout.license(), "MIT License\n")?;

        let out = layout.out_dir(crate::config::Configuration::Release);
        let manifest = crate::artefact::manifest::PlatformManifest::new(&self.names);
        fs::create_dir_all(&out)?;
        for binary in manifest.binaries_for(platform) {
            fs::write(out.join(&binary), format!("contents of {binary}"))?;
        }
        for directory in manifest.directories_for(platform) {
            let dir = out.join(&directory);
            fs::create_dir_all(dir.join("nested"))?;
            fs::write(dir.join("a.pak"), "a")?;
            fs::write(dir.join("nested/b.pak"), "b")?;
        }

        let chromium = layout.chromium_dir();
        fs::create_dir_all(&chromium)?;
        for tool in crate::artefact::manifest::tool_binaries_for(platform) {
            fs::write(chromium.join(tool), "tool")?;
        }
        fs::write(layout.chromium_licenses(), "<html></html>\n")?;

        let ffmpeg = layout.ffmpeg_dir();
        fs::create_dir_all(&ffmpeg)?;
        fs::write(
            ffmpeg.join(crate::artefact::manifest::ffmpeg_library_for(platform)),
            "codec",
        )?;
        Ok(())
    }

    /// The checkout's layout.
    #[must_use]
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// Remove a file below the source root.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be removed.
    pub fn remove(&self, relative: &str) -> io::Result<()> {
        fs::remove_file(self.layout.root().join(relative))
    }

    /// A packager configuration for this checkout that writes archives into
    /// the staging directory.
    #[must_use]
    pub fn packager_config(&self, version: &str, arch: &str) -> PackagerConfig {
        PackagerConfig::for_layout(
            &self.layout,
            self.names.clone(),
            VersionString::new(version),
            TargetArch::new(arch),
        )
    }
}
