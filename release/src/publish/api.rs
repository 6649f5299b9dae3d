//! Release-hosting API surface used by the publisher.
//!
//! Only the operations the publishing flow needs are modelled. The records
//! deserialise from GitHub's release JSON; unknown fields are ignored.

use super::PublishError;
use serde::{Deserialize, Serialize};

/// An asset attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    /// Asset id.
    pub id: u64,
    /// File name of the asset.
    pub name: String,
}

/// A release record, published or draft.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Release id.
    pub id: u64,
    /// Tag the release is (or will be) attached to.
    pub tag_name: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the release is still an unpublished draft.
    pub draft: bool,
    /// Uploaded assets.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Find an asset by file name.
    #[must_use]
    pub fn asset_named(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Body of a release creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag for the release.
    pub tag_name: String,
    /// Display name.
    pub name: String,
    /// Release note body.
    pub body: String,
    /// Create as an unpublished draft.
    pub draft: bool,
}

/// Operations against the release-hosting service.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseApi {
    /// List every release of the repository, drafts included.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] when the request fails.
    fn list_releases(&self) -> Result<Vec<Release>, PublishError>;

    /// Create a release.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] when the request fails.
    fn create_release(&self, release: &NewRelease) -> Result<Release, PublishError>;

    /// Delete an asset by id.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] when the request fails.
    fn delete_asset(&self, asset_id: u64) -> Result<(), PublishError>;

    /// Upload `content` as an asset named `name` on release `release_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] when the request fails.
    fn upload_asset(
        &self,
        release_id: u64,
        name: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Asset, PublishError>;

    /// Mark release `release_id` as published.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] when the request fails.
    fn publish_release(&self, release_id: u64) -> Result<Release, PublishError>;
}
