//! GitHub REST implementation of [`ReleaseApi`].
//!
//! Requests are authenticated with a personal access token read from
//! `MESON_GITHUB_TOKEN`. Non-success statuses are returned as
//! [`PublishError::Http`] with the response body attached, never retried.

use super::PublishError;
use super::api::{Asset, NewRelease, Release, ReleaseApi};
use log::debug;
use meson_common::env::prefixed_var;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;

/// Default repository releases are published to.
pub const DEFAULT_REPOSITORY: &str = "go-meson/framework";

/// Suffix of the token variable after the `MESON_` prefix.
const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Full name of the token variable, for error messages.
const TOKEN_VAR_FULL: &str = "MESON_GITHUB_TOKEN";

const API_BASE: &str = "https://api.github.com";
const UPLOADS_BASE: &str = "https://uploads.github.com";
const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("meson-release/", env!("CARGO_PKG_VERSION"));

/// Network timeout for API calls; uploads of large archives are slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

type HttpResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

/// Client for one repository's releases.
#[derive(Clone)]
pub struct GitHubClient {
    repo: String,
    token: String,
    api_base: String,
    uploads_base: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("uploads_base", &self.uploads_base)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for `repo` (`owner/name`) with an explicit token.
    #[must_use]
    pub fn new(repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            token: token.into(),
            api_base: API_BASE.to_owned(),
            uploads_base: UPLOADS_BASE.to_owned(),
        }
    }

    /// Create a client for `repo` using the token from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingToken`] when `MESON_GITHUB_TOKEN` is
    /// unset or empty.
    pub fn from_env(repo: impl Into<String>) -> Result<Self, PublishError> {
        let token = prefixed_var(TOKEN_VAR).ok_or(PublishError::MissingToken {
            var: TOKEN_VAR_FULL,
        })?;
        Ok(Self::new(repo, token))
    }

    /// Point the client at different API and upload hosts.
    #[must_use]
    pub fn with_base_urls(mut self, api: impl Into<String>, uploads: impl Into<String>) -> Self {
        self.api_base = api.into().trim_end_matches('/').to_owned();
        self.uploads_base = uploads.into().trim_end_matches('/').to_owned();
        self
    }

    /// The repository this client targets.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/releases", self.api_base, self.repo)
    }

    fn authorization(&self) -> String {
        format!("token {}", self.token)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, PublishError> {
        let result = http_agent()
            .get(url)
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .call();
        decode(url, &finish("GET", url, result)?)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, PublishError> {
        let payload = serde_json::to_vec(body).map_err(|e| PublishError::Decode {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let agent = http_agent();
        let request = if method == "PATCH" {
            agent.patch(url)
        } else {
            agent.post(url)
        };
        let result = request
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .send(&payload[..]);
        decode(url, &finish(method, url, result)?)
    }
}

impl ReleaseApi for GitHubClient {
    fn list_releases(&self) -> Result<Vec<Release>, PublishError> {
        self.get_json(&self.releases_url())
    }

    fn create_release(&self, release: &NewRelease) -> Result<Release, PublishError> {
        let body = serde_json::to_value(release).map_err(|e| PublishError::Decode {
            url: self.releases_url(),
            reason: e.to_string(),
        })?;
        self.send_json("POST", &self.releases_url(), &body)
    }

    fn delete_asset(&self, asset_id: u64) -> Result<(), PublishError> {
        let url = format!("{}/assets/{asset_id}", self.releases_url());
        let result = http_agent()
            .delete(&url)
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .call();
        finish("DELETE", &url, result).map(drop)
    }

    fn upload_asset(
        &self,
        release_id: u64,
        name: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Asset, PublishError> {
        let url = format!(
            "{}/repos/{}/releases/{release_id}/assets",
            self.uploads_base, self.repo
        );
        debug!("uploading {name} ({} bytes) to release {release_id}", content.len());
        let result = http_agent()
            .post(&url)
            .query("name", name)
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", content_type)
            .send(content);
        decode(&url, &finish("POST", &url, result)?)
    }

    fn publish_release(&self, release_id: u64) -> Result<Release, PublishError> {
        let url = format!("{}/{release_id}", self.releases_url());
        self.send_json("PATCH", &url, &serde_json::json!({ "draft": false }))
    }
}

/// Shared `ureq` agent; statuses are inspected by [`finish`], not raised.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Read the body of `result`, mapping transport failures and non-2xx
/// statuses to errors.
fn finish(method: &'static str, url: &str, result: HttpResult) -> Result<String, PublishError> {
    let response = result.map_err(|e| PublishError::Transport {
        method,
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .read_to_string()
        .map_err(|e| PublishError::Transport {
            method,
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
    debug!("{method} {url} -> {status}");
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(PublishError::Http {
            method,
            url: url.to_owned(),
            status,
            body,
        })
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, PublishError> {
    serde_json::from_str(body).map_err(|e| PublishError::Decode {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
