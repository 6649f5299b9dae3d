//! Behaviour-driven tests for publishing to a draft release.
//!
//! Scenarios package a throwaway checkout, then run `upload` against an
//! in-memory release API.

use meson_common::Platform;
use meson_release::cli::{DistArgs, TargetArgs, UploadArgs};
use meson_release::commands::{run_dist, run_upload};
use meson_release::config::Configuration;
use meson_release::error::ReleaseError;
use meson_release::publish::notes::{EditorNotes, PlaceholderNotes, ReleaseNotes};
use meson_release::test_support::{ExpectedCall, FakeSourceTree, InMemoryReleaseApi, StubRunner};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PublishWorld {
    tree: Option<FakeSourceTree>,
    api: InMemoryReleaseApi,
    empty_notes: bool,
    error: Option<ReleaseError>,
}

#[fixture]
fn world() -> PublishWorld {
    PublishWorld::default()
}

fn linux_target() -> TargetArgs {
    TargetArgs {
        platform: Some("linux".to_owned()),
        arch: Some("x64".to_owned()),
    }
}

fn upload(world: &mut PublishWorld, publish_release: bool) {
    let args = UploadArgs {
        tag: None,
        publish_release,
        repo: "go-meson/framework".to_owned(),
        target: linux_target(),
    };
    let editor = StubRunner::new(vec![ExpectedCall::any_args("nano")]);
    let editor_notes = EditorNotes::new("nano", &editor);
    let notes: &dyn ReleaseNotes = if world.empty_notes {
        &editor_notes
    } else {
        &PlaceholderNotes
    };
    let tree = world.tree.as_ref().expect("checkout set");
    let result = temp_env::with_var_unset("MAS_BUILD", || {
        run_upload(&args, tree.layout(), &world.api, notes)
    });
    if let Err(err) = result {
        world.error = Some(err);
    }
}

fn drafts(world: &PublishWorld) -> Vec<meson_release::publish::api::Release> {
    world.api.releases().into_iter().filter(|r| r.draft).collect()
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[given("a packaged linux checkout at version \"{version}\"")]
fn given_packaged(world: &mut PublishWorld, version: String) {
    let tree = FakeSourceTree::new(Platform::Linux, &version).expect("fake checkout");
    let args = DistArgs {
        configuration: Configuration::Release,
        skip_build: true,
        target: linux_target(),
    };
    let runner = StubRunner::new(vec![ExpectedCall::any_args("strip")]);
    temp_env::with_var_unset("MAS_BUILD", || {
        run_dist(&args, tree.layout(), false, &runner).expect("packaging succeeds");
    });
    world.tree = Some(tree);
}

#[given("no existing releases")]
fn given_no_releases(world: &mut PublishWorld) {
    world.api = InMemoryReleaseApi::new();
}

#[given("an existing draft tagged \"{tag}\"")]
fn given_existing_draft(world: &mut PublishWorld, tag: String) {
    world.api = std::mem::take(&mut world.api).with_release(&tag, true);
}

#[given("a published release tagged \"{tag}\"")]
fn given_published_release(world: &mut PublishWorld, tag: String) {
    world.api = std::mem::take(&mut world.api).with_release(&tag, false);
}

#[given("the editor leaves the release note empty")]
fn given_empty_notes(world: &mut PublishWorld) {
    world.empty_notes = true;
}

#[when("the archives are uploaded")]
fn when_uploaded(world: &mut PublishWorld) {
    upload(world, false);
}

#[when("the archives are uploaded twice")]
fn when_uploaded_twice(world: &mut PublishWorld) {
    upload(world, false);
    upload(world, false);
}

#[when("the archives are uploaded and published")]
fn when_uploaded_and_published(world: &mut PublishWorld) {
    upload(world, true);
}

#[then("exactly {count} draft exists")]
fn then_draft_count(world: &mut PublishWorld, count: usize) {
    assert!(world.error.is_none(), "upload failed: {:?}", world.error);
    assert_eq!(drafts(world).len(), count);
}

#[then("no draft remains")]
fn then_no_draft(world: &mut PublishWorld) {
    assert!(world.error.is_none(), "upload failed: {:?}", world.error);
    assert!(drafts(world).is_empty());
}

#[then("the draft is tagged \"{tag}\"")]
fn then_draft_tagged(world: &mut PublishWorld, tag: String) {
    let drafts = drafts(world);
    assert_eq!(drafts.len(), 1, "{drafts:?}");
    assert_eq!(drafts[0].tag_name, tag);
}

#[then("the draft has {count} assets")]
fn then_asset_count(world: &mut PublishWorld, count: usize) {
    let drafts = drafts(world);
    assert_eq!(drafts[0].assets.len(), count, "{:?}", drafts[0].assets);
}

#[then("the upload is abandoned with exit code {code}")]
fn then_abandoned(world: &mut PublishWorld, code: i32) {
    let err = world.error.as_ref().expect("upload should abort");
    assert_eq!(err.exit_code(), code);
    assert_eq!(err.to_string(), "quit due to empty release note");
}

#[then("no release is created")]
fn then_nothing_created(world: &mut PublishWorld) {
    assert_eq!(world.api.created_count(), 0);
    assert!(world.api.uploads().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/publishing.feature",
    name = "First upload creates a draft"
)]
fn scenario_first_upload(world: PublishWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/publishing.feature",
    name = "An existing draft is reused"
)]
fn scenario_existing_draft(world: PublishWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/publishing.feature",
    name = "A published tag is not reused"
)]
fn scenario_published_tag(world: PublishWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/publishing.feature",
    name = "Uploading again replaces assets"
)]
fn scenario_reupload(world: PublishWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/publishing.feature",
    name = "Publishing marks the release published"
)]
fn scenario_publish(world: PublishWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/publishing.feature",
    name = "An empty release note abandons the upload"
)]
fn scenario_empty_notes(world: PublishWorld) {
    let _ = world;
}
