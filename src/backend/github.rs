//! GitHub-backed implementation of the backend trait.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::config::ConfigError;
use crate::error::BackendError;
use crate::http::{check_status, HttpClient};

use super::{
    resolve_release, Asset, Backend, Contributor, Release, ReleaseMetadata, Repository,
    TagSelector, TeamMember,
};

/// Name of the machine-readable patch index attached to patch releases.
const PATCHES_ASSET: &str = "patches.json";

/// How many of the most recent releases are scanned when deriving the
/// latest prerelease. The window is fixed; it is never widened when no
/// prerelease is found.
const PRERELEASE_WINDOW: u32 = 10;

/// Upstream paging defaults applied when the caller does not page.
const DEFAULT_PER_PAGE: u32 = 30;
const DEFAULT_PAGE: u32 = 1;

/// Pinned REST API version sent with every request.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub name: Option<String>,
        pub body: Option<String>,
        pub draft: bool,
        pub prerelease: bool,
        pub created_at: String,
        /// Null while a release is an unpublished draft.
        pub published_at: Option<String>,
        pub assets: Vec<Asset>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub name: String,
        pub content_type: String,
        pub browser_download_url: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Contributor {
        pub login: String,
        pub avatar_url: String,
        pub html_url: String,
        pub contributions: u64,
    }

    #[derive(Deserialize, Debug)]
    pub struct Member {
        pub login: String,
        pub avatar_url: String,
        pub html_url: String,
    }
}

/// Backend over the GitHub REST API.
pub struct GitHub {
    http: HttpClient,
    api_url: String,
    headers: HeaderMap,
}

impl GitHub {
    /// Creates a backend for the given API base URL. When a token is
    /// present it is attached as a bearer credential to every request
    /// this backend makes, and to nothing else sharing the HTTP client.
    pub fn new(http: HttpClient, api_url: &str, token: Option<&str>) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        if let Some(token) = token {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn releases_url(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_url, repository.owner, repository.name
        )
    }
}

#[async_trait]
impl Backend for GitHub {
    #[tracing::instrument(skip(self, repository))]
    async fn list_releases(
        &self,
        repository: &Repository,
        per_page: Option<u32>,
        page: Option<u32>,
    ) -> Result<Vec<Release>, BackendError> {
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).to_string();
        let page = page.unwrap_or(DEFAULT_PAGE).to_string();
        let url = self.releases_url(repository);

        debug!("Fetching releases for {} from {}...", repository, url);

        let releases: Vec<api::Release> = self
            .http
            .get_json_with_query(
                &url,
                self.headers.clone(),
                &[("per_page", &per_page), ("page", &page)],
            )
            .await?;

        Ok(releases.into_iter().map(Release::from).collect())
    }

    #[tracing::instrument(skip(self, repository))]
    async fn release_by_tag(
        &self,
        repository: &Repository,
        tag: &str,
    ) -> Result<Release, BackendError> {
        let url = format!("{}/tags/{}", self.releases_url(repository), tag);

        debug!("Fetching release {} of {} from {}...", tag, repository, url);

        let release: api::Release = self.http.get_json(&url, self.headers.clone()).await?;
        Ok(release.into())
    }

    #[tracing::instrument(skip(self, repository))]
    async fn latest_release(&self, repository: &Repository) -> Result<Release, BackendError> {
        let url = format!("{}/latest", self.releases_url(repository));

        debug!("Fetching latest release of {} from {}...", repository, url);

        let release: api::Release = self.http.get_json(&url, self.headers.clone()).await?;
        Ok(release.into())
    }

    #[tracing::instrument(skip(self, repository))]
    async fn latest_prerelease(&self, repository: &Repository) -> Result<Release, BackendError> {
        let url = self.releases_url(repository);
        let window = PRERELEASE_WINDOW.to_string();

        debug!(
            "Scanning the {} most recent releases of {} for a prerelease...",
            PRERELEASE_WINDOW, repository
        );

        let releases: Vec<api::Release> = self
            .http
            .get_json_with_query(
                &url,
                self.headers.clone(),
                &[("per_page", &window), ("page", "1")],
            )
            .await?;

        releases
            .into_iter()
            .find(|release| release.prerelease)
            .map(Release::from)
            .ok_or_else(|| {
                BackendError::NotFound(format!(
                    "no prerelease among the {} most recent releases of {}",
                    PRERELEASE_WINDOW, repository
                ))
            })
    }

    #[tracing::instrument(skip(self, repository))]
    async fn contributors(
        &self,
        repository: &Repository,
    ) -> Result<Vec<Contributor>, BackendError> {
        let url = format!(
            "{}/repos/{}/{}/contributors",
            self.api_url, repository.owner, repository.name
        );

        debug!("Fetching contributors of {} from {}...", repository, url);

        let contributors: Vec<api::Contributor> =
            self.http.get_json(&url, self.headers.clone()).await?;
        Ok(contributors.into_iter().map(Contributor::from).collect())
    }

    #[tracing::instrument(skip(self, repository))]
    async fn team_members(
        &self,
        repository: &Repository,
    ) -> Result<Vec<TeamMember>, BackendError> {
        let url = format!("{}/orgs/{}/members", self.api_url, repository.owner);

        debug!("Fetching members of {} from {}...", repository.owner, url);

        let members: Vec<api::Member> = self.http.get_json(&url, self.headers.clone()).await?;
        Ok(members.into_iter().map(TeamMember::from).collect())
    }

    #[tracing::instrument(skip(self, repository, selector))]
    async fn patches(
        &self,
        repository: &Repository,
        selector: &TagSelector,
        dev: bool,
    ) -> Result<Vec<serde_json::Value>, BackendError> {
        debug!(
            "Resolving release {} of {} for its patch index (dev: {})...",
            selector, repository, dev
        );

        let release = resolve_release(self, repository, selector, dev).await?;
        let asset = release
            .assets
            .iter()
            .find(|asset| asset.name == PATCHES_ASSET)
            .ok_or_else(|| {
                BackendError::NotFound(format!(
                    "release {} of {} has no {} asset",
                    release.metadata.tag_name, repository, PATCHES_ASSET
                ))
            })?;

        debug!("Downloading {} from {}...", PATCHES_ASSET, asset.download_url);

        let response =
            check_status(self.http.get(&asset.download_url, self.headers.clone()).await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl From<api::Release> for Release {
    fn from(release: api::Release) -> Self {
        Release {
            metadata: ReleaseMetadata {
                tag_name: release.tag_name,
                display_name: release.name.unwrap_or_default(),
                body: release.body.unwrap_or_default(),
                is_draft: release.draft,
                is_prerelease: release.prerelease,
                created_at: release.created_at,
                published_at: release.published_at.unwrap_or_default(),
            },
            assets: release.assets.into_iter().map(Asset::from).collect(),
        }
    }
}

impl From<api::Asset> for Asset {
    fn from(asset: api::Asset) -> Self {
        Asset {
            name: asset.name,
            content_type: asset.content_type,
            download_url: asset.browser_download_url,
        }
    }
}

impl From<api::Contributor> for Contributor {
    fn from(contributor: api::Contributor) -> Self {
        Contributor {
            login: contributor.login,
            avatar_url: contributor.avatar_url,
            profile_url: contributor.html_url,
            contribution_count: contributor.contributions,
        }
    }
}

impl From<api::Member> for TeamMember {
    fn from(member: api::Member) -> Self {
        TeamMember {
            login: member.login,
            avatar_url: member.avatar_url,
            profile_url: member.html_url,
        }
    }
}
