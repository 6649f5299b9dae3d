//! Tests for subcommand orchestration against a throwaway checkout.

use super::*;
use crate::config::Configuration;
use crate::publish::PublishError;
use crate::publish::notes::PlaceholderNotes;
use crate::test_support::{ExpectedCall, FakeSourceTree, InMemoryReleaseApi, StubRunner};
use rstest::{fixture, rstest};
use std::fs;

#[fixture]
fn tree() -> FakeSourceTree {
    FakeSourceTree::new(Platform::Linux, "0.1.0").expect("fake source tree")
}

fn linux_target(arch: Option<&str>) -> TargetArgs {
    TargetArgs {
        platform: Some("linux".to_owned()),
        arch: arch.map(str::to_owned),
    }
}

fn dist_args() -> DistArgs {
    DistArgs {
        configuration: Configuration::Release,
        skip_build: true,
        target: linux_target(None),
    }
}

fn upload_args(publish_release: bool) -> UploadArgs {
    UploadArgs {
        tag: None,
        publish_release,
        repo: "go-meson/framework".to_owned(),
        target: linux_target(None),
    }
}

fn package(tree: &FakeSourceTree) -> PackageOutput {
    let runner = StubRunner::new(vec![ExpectedCall::any_args("strip")]);
    let output = run_dist(&dist_args(), tree.layout(), false, &runner).expect("dist succeeds");
    runner.assert_finished();
    output
}

#[rstest]
fn dist_names_archives_from_manifest(tree: FakeSourceTree) {
    let output = temp_env::with_var_unset("MAS_BUILD", || package(&tree));

    assert_eq!(
        output.archive,
        tree.layout().dist_dir().join("meson-v0.1.0-linux-x64.zip")
    );
}

#[rstest]
fn dist_reads_target_arch_marker(tree: FakeSourceTree) {
    fs::write(tree.layout().target_arch_marker(), "arm\n").expect("write marker");
    let runner = StubRunner::new(vec![ExpectedCall::any_args("arm-linux-gnueabihf-strip")]);

    let output = temp_env::with_var_unset("MAS_BUILD", || {
        run_dist(&dist_args(), tree.layout(), false, &runner)
    })
    .expect("dist succeeds");

    assert_eq!(output.archive.file_name(), Some("meson-v0.1.0-linux-armv7l.zip"));
}

#[rstest]
fn dist_rejects_unknown_platform(tree: FakeSourceTree) {
    let mut args = dist_args();
    args.target.platform = Some("beos".to_owned());

    let err = run_dist(&args, tree.layout(), false, &StubRunner::default())
        .expect_err("unsupported platform");

    assert!(matches!(err, ReleaseError::UnsupportedPlatform(_)), "{err:?}");
    assert!(err.to_string().contains("beos"));
    assert_eq!(err.exit_code(), 1);
}

#[rstest]
fn dist_propagates_build_exit_code(tree: FakeSourceTree) {
    let mut args = dist_args();
    args.skip_build = false;
    let runner = StubRunner::new(vec![ExpectedCall::any_args(
        tree.layout()
            .ninja(Platform::current().expect("supported host"))
            .as_str(),
    )
    .exit_code(4)]);

    let err = run_dist(&args, tree.layout(), true, &runner).expect_err("build fails");

    assert_eq!(err.exit_code(), 4);
    assert!(runner.seen()[0].ends_with("-C out/R Meson -v"), "{:?}", runner.seen());
}

#[rstest]
fn upload_sends_archives_and_checksums(tree: FakeSourceTree) {
    let api = InMemoryReleaseApi::new();

    let report = temp_env::with_var_unset("MAS_BUILD", || {
        package(&tree);
        run_upload(&upload_args(false), tree.layout(), &api, &PlaceholderNotes)
    })
    .expect("upload succeeds");

    let names: Vec<String> = api.uploads().into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        [
            "meson-v0.1.0-linux-x64.zip",
            "meson-v0.1.0-linux-x64.zip.sha256sum",
            "ffmpeg-v0.1.0-linux-x64.zip",
            "ffmpeg-v0.1.0-linux-x64.zip.sha256sum",
        ]
    );
    assert_eq!(report.release_name, "meson v0.1.0");
    assert!(!report.published);
    assert!(api.releases().iter().all(|r| r.draft));
}

#[rstest]
fn upload_twice_reuses_draft_and_replaces_assets(tree: FakeSourceTree) {
    let api = InMemoryReleaseApi::new();

    temp_env::with_var_unset("MAS_BUILD", || {
        package(&tree);
        run_upload(&upload_args(false), tree.layout(), &api, &PlaceholderNotes)
            .expect("first upload");
        run_upload(&upload_args(false), tree.layout(), &api, &PlaceholderNotes)
            .expect("second upload");
    });

    assert_eq!(api.created_count(), 1);
    assert_eq!(api.releases()[0].assets.len(), 4);
}

#[rstest]
fn upload_with_publish_clears_draft(tree: FakeSourceTree) {
    let api = InMemoryReleaseApi::new();

    let report = temp_env::with_var_unset("MAS_BUILD", || {
        package(&tree);
        run_upload(&upload_args(true), tree.layout(), &api, &PlaceholderNotes)
    })
    .expect("upload succeeds");

    assert!(report.published);
    assert!(api.releases().iter().all(|r| !r.draft));
}

#[rstest]
fn upload_without_archives_never_contacts_api(tree: FakeSourceTree) {
    let api = InMemoryReleaseApi::new();

    let err = run_upload(&upload_args(false), tree.layout(), &api, &PlaceholderNotes)
        .expect_err("archives missing");

    assert!(matches!(err, ReleaseError::MissingArtifact { .. }), "{err:?}");
    assert_eq!(api.list_calls(), 0);
}

#[rstest]
fn upload_uses_explicit_tag(tree: FakeSourceTree) {
    let api = InMemoryReleaseApi::new();
    let mut args = upload_args(false);
    args.tag = Some("v9.9.9".to_owned());

    temp_env::with_var_unset("MAS_BUILD", || {
        package(&tree);
        run_upload(&args, tree.layout(), &api, &PlaceholderNotes).expect("upload succeeds");
    });

    assert_eq!(api.releases()[0].tag_name, "v9.9.9");
}

#[cfg(unix)]
#[rstest]
fn relative_source_root_runs_ninja_by_absolute_path(tree: FakeSourceTree) {
    let root = tree.layout().root();
    let canonical = SourceLayout::new(root.canonicalize_utf8().expect("canonical root"));
    let ninja = canonical.ninja(Platform::current().expect("supported host"));
    let cli = Cli {
        command: Command::Build(BuildArgs {
            configuration: vec![Configuration::Release],
            target: Some("Meson".to_owned()),
        }),
        source_root: Some(crate::test_support::relative_to_cwd(root).expect("relative root")),
        verbosity: 0,
        quiet: true,
    };
    let runner = StubRunner::new(vec![ExpectedCall::new(
        ninja.as_str(),
        &["-C", "out/R", "Meson"],
    )]);

    run(&cli, &runner, &mut Vec::new()).expect("build succeeds");

    runner.assert_finished();
    assert!(ninja.is_absolute());
}

#[test]
fn upload_without_token_fails_before_network() {
    let cli = Cli {
        command: Command::Upload(upload_args(false)),
        source_root: Some(Utf8PathBuf::from("/nonexistent/meson")),
        verbosity: 0,
        quiet: false,
    };
    let mut stderr = Vec::new();

    let err = temp_env::with_var_unset("MESON_GITHUB_TOKEN", || {
        run(&cli, &StubRunner::default(), &mut stderr)
    })
    .expect_err("token missing");

    assert!(
        matches!(err, ReleaseError::Publish(PublishError::MissingToken { .. })),
        "{err:?}"
    );
    assert_eq!(err.exit_code(), 1);
}

#[rstest]
fn version_header_is_written_from_manifest(tree: FakeSourceTree) {
    let template = tree.layout().version_header_template();
    fs::create_dir_all(template.parent().expect("template dir")).expect("mkdir script");
    fs::write(&template, "{PLACEHOLDER_VERSION_MAJOR}.{PLACEHOLDER_VERSION_MINOR}")
        .expect("write template");

    let (path, written) = run_version_header(tree.layout()).expect("header written");

    assert!(written);
    assert_eq!(fs::read_to_string(path).expect("read header"), "0.1");
    let (_, rewritten) = run_version_header(tree.layout()).expect("header checked");
    assert!(!rewritten);
}

#[rstest]
fn run_reports_progress_unless_quiet(tree: FakeSourceTree) {
    let template = tree.layout().version_header_template();
    fs::create_dir_all(template.parent().expect("template dir")).expect("mkdir script");
    fs::write(&template, "header").expect("write template");
    let mut cli = Cli {
        command: Command::VersionHeader,
        source_root: Some(tree.layout().root().to_owned()),
        verbosity: 0,
        quiet: true,
    };

    let mut quiet_stderr = Vec::new();
    run(&cli, &StubRunner::default(), &mut quiet_stderr).expect("quiet run");
    cli.quiet = false;
    let mut stderr = Vec::new();
    run(&cli, &StubRunner::default(), &mut stderr).expect("loud run");

    assert!(quiet_stderr.is_empty());
    let text = String::from_utf8(stderr).expect("utf-8 stderr");
    assert!(text.contains("is up to date"), "{text}");
}
