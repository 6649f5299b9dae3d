//! Behaviour-driven tests for bundle packaging.
//!
//! Scenarios run the `dist` pipeline against a throwaway checkout with the
//! build skipped and the stripper stubbed.

use camino::Utf8Path;
use meson_common::{Platform, TargetArch};
use meson_release::cli::{DistArgs, TargetArgs};
use meson_release::commands::run_dist;
use meson_release::config::Configuration;
use meson_release::error::ReleaseError;
use meson_release::packager::{PackageOutput, strip_tool_for};
use meson_release::test_support::{ExpectedCall, FakeSourceTree, StubRunner};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PackagingWorld {
    tree: Option<FakeSourceTree>,
    outputs: Vec<PackageOutput>,
    archive_bytes: Vec<Vec<u8>>,
    error: Option<ReleaseError>,
}

#[fixture]
fn world() -> PackagingWorld {
    PackagingWorld::default()
}

fn tree(world: &PackagingWorld) -> &FakeSourceTree {
    world.tree.as_ref().expect("checkout set")
}

fn package(world: &mut PackagingWorld, arch: &str) {
    let args = DistArgs {
        configuration: Configuration::Release,
        skip_build: true,
        target: TargetArgs {
            platform: Some("linux".to_owned()),
            arch: Some(arch.to_owned()),
        },
    };
    let runner = StubRunner::new(vec![ExpectedCall::any_args(strip_tool_for(
        &TargetArch::new(arch),
    ))]);
    let result = temp_env::with_var_unset("MAS_BUILD", || {
        run_dist(&args, tree(world).layout(), false, &runner)
    });
    match result {
        Ok(output) => {
            let bytes = fs::read(&output.archive).expect("read archive");
            world.archive_bytes.push(bytes);
            world.outputs.push(output);
        }
        Err(err) => world.error = Some(err),
    }
}

fn archive_entries(path: &Utf8Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open archive");
    let mut archive = zip::ZipArchive::new(file).expect("read archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[given("a linux checkout at version \"{version}\"")]
fn given_checkout(world: &mut PackagingWorld, version: String) {
    world.tree = Some(FakeSourceTree::new(Platform::Linux, &version).expect("fake checkout"));
}

#[given("the build output lacks \"{name}\"")]
fn given_missing_output(world: &mut PackagingWorld, name: String) {
    tree(world)
        .remove(&format!("out/R/{name}"))
        .expect("remove build output");
}

#[when("the bundle is packaged for \"{arch}\"")]
fn when_packaged(world: &mut PackagingWorld, arch: String) {
    package(world, &arch);
}

#[when("the bundle is packaged twice for \"{arch}\"")]
fn when_packaged_twice(world: &mut PackagingWorld, arch: String) {
    package(world, &arch);
    package(world, &arch);
}

#[then("the archive \"{name}\" exists")]
fn then_archive_exists(world: &mut PackagingWorld, name: String) {
    assert!(world.error.is_none(), "packaging failed: {:?}", world.error);
    let path = tree(world).layout().dist_dir().join(&name);
    assert!(path.is_file(), "{path} missing");
}

#[then("the archive \"{name}\" contains \"{entry}\"")]
fn then_archive_contains(world: &mut PackagingWorld, name: String, entry: String) {
    let path = tree(world).layout().dist_dir().join(&name);
    let entries = archive_entries(&path);
    assert!(entries.contains(&entry), "{entry} not in {entries:?}");
}

#[then("packaging fails naming \"{name}\"")]
fn then_fails_naming(world: &mut PackagingWorld, name: String) {
    let err = world.error.as_ref().expect("packaging should fail");
    assert!(
        matches!(err, ReleaseError::MissingArtifact { .. }),
        "expected MissingArtifact, got {err:?}"
    );
    assert!(err.to_string().contains(&name), "{err}");
}

#[then("both runs produce byte-identical archives")]
fn then_identical(world: &mut PackagingWorld) {
    assert_eq!(world.archive_bytes.len(), 2);
    assert_eq!(world.archive_bytes[0], world.archive_bytes[1]);
    assert_eq!(world.outputs[0], world.outputs[1]);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/packaging.feature", name = "Package a linux bundle")]
fn scenario_package_linux(world: PackagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "ARM archives use the armv7l name"
)]
fn scenario_arm_name(world: PackagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "A missing binary is reported by name"
)]
fn scenario_missing_binary(world: PackagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "Packaging twice is reproducible"
)]
fn scenario_reproducible(world: PackagingWorld) {
    let _ = world;
}
