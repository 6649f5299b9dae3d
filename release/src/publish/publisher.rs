//! Draft selection and asset upload.
//!
//! A release moves through `no draft -> draft -> draft with assets ->
//! published`. Any existing draft is reused regardless of its tag, so
//! repeated uploads never create a second draft.

use super::PublishError;
use super::api::{Asset, NewRelease, Release, ReleaseApi};
use super::notes::ReleaseNotes;
use crate::artefact::checksum::sign;
use crate::error::ReleaseError;
use camino::Utf8Path;
use log::{info, warn};
use std::fs;

/// Tag used when the requested tag already belongs to a published release.
pub const PLACEHOLDER_TAG: &str = "do-not-publish-me";

/// Content type of uploaded archives.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Content type of uploaded checksum sidecars.
pub const CHECKSUM_CONTENT_TYPE: &str = "text/plain";

/// Publishes archives to a draft release.
pub struct ReleasePublisher<'a> {
    api: &'a dyn ReleaseApi,
    project: String,
    notes: &'a dyn ReleaseNotes,
}

impl<'a> ReleasePublisher<'a> {
    /// Create a publisher for `project` releases.
    #[must_use]
    pub fn new(api: &'a dyn ReleaseApi, project: impl Into<String>, notes: &'a dyn ReleaseNotes) -> Self {
        Self {
            api,
            project: project.into(),
            notes,
        }
    }

    /// Return the existing draft, or create one for `tag`.
    ///
    /// When no draft exists and a published release already carries `tag`,
    /// the draft is created under [`PLACEHOLDER_TAG`] instead.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if listing or creating fails, or if the
    /// release notes cannot be composed.
    pub fn find_or_create_draft(&self, tag: &str) -> Result<Release, PublishError> {
        let releases = self.api.list_releases()?;
        if let Some(draft) = releases.iter().find(|release| release.draft) {
            if draft.tag_name != tag {
                warn!(
                    "reusing draft {} tagged {} for requested tag {tag}",
                    draft.id, draft.tag_name
                );
            }
            info!("reusing draft release {}", draft.id);
            return Ok(draft.clone());
        }

        let tag_exists = releases
            .iter()
            .any(|release| !release.draft && release.tag_name == tag);
        let tag = if tag_exists {
            warn!("{tag} is already published; drafting under {PLACEHOLDER_TAG}");
            PLACEHOLDER_TAG
        } else {
            tag
        };

        let name = format!("{} {tag}", self.project);
        let body = self.notes.compose(&name)?;
        let draft = self.api.create_release(&NewRelease {
            tag_name: tag.to_owned(),
            name,
            body,
            draft: true,
        })?;
        info!("created draft release {} for {tag}", draft.id);
        Ok(draft)
    }

    /// Upload `content` to `draft` as `name`, replacing any asset with the
    /// same name.
    ///
    /// A failure to delete the old asset is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the upload fails.
    pub fn upload_asset(
        &self,
        draft: &mut Release,
        name: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Asset, PublishError> {
        if let Some(existing) = draft.asset_named(name).cloned() {
            match self.api.delete_asset(existing.id) {
                Ok(()) => draft.assets.retain(|asset| asset.id != existing.id),
                Err(err) => warn!("could not delete existing asset {name}: {err}"),
            }
        }
        let asset = self.api.upload_asset(draft.id, name, content, content_type)?;
        draft.assets.retain(|a| a.name != name);
        draft.assets.push(asset.clone());
        Ok(asset)
    }

    /// Upload the archive at `path` followed by its `.sha256sum` sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::MissingArtifact`] if the archive does not
    /// exist, or the first I/O or publishing failure.
    pub fn upload_with_checksum(
        &self,
        draft: &mut Release,
        path: &Utf8Path,
    ) -> crate::error::Result<()> {
        let name = path
            .file_name()
            .filter(|_| path.is_file())
            .ok_or_else(|| ReleaseError::MissingArtifact {
                path: path.to_owned(),
            })?;
        let content = fs::read(path)?;
        info!("uploading {name}");
        self.upload_asset(draft, name, &content, ZIP_CONTENT_TYPE)?;

        let signed = sign(path)?;
        let checksum_name = signed
            .checksum_path
            .file_name()
            .ok_or_else(|| ReleaseError::MissingArtifact {
                path: signed.checksum_path.clone(),
            })?;
        self.upload_asset(
            draft,
            checksum_name,
            signed.digest.as_str().as_bytes(),
            CHECKSUM_CONTENT_TYPE,
        )?;
        Ok(())
    }

    /// Mark `draft` as published.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the update fails.
    pub fn publish(&self, draft: &Release) -> Result<Release, PublishError> {
        info!("publishing release {}", draft.id);
        self.api.publish_release(draft.id)
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
