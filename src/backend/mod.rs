//! Backend abstraction over release-hosting providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

mod github;

pub use github::GitHub;

/// Repository identifier (owner/name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error parsing an `owner/name` repository reference.
#[derive(Debug, thiserror::Error)]
#[error("invalid repository reference '{0}', expected 'owner/name'")]
pub struct InvalidRepository(String);

impl std::str::FromStr for Repository {
    type Err = InvalidRepository;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(Repository::new(*owner, *name))
            }
            _ => Err(InvalidRepository(s.to_string())),
        }
    }
}

/// Descriptive fields of a release, without its assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    pub tag_name: String,
    /// Human title of the release. Empty when the upstream has none.
    pub display_name: String,
    /// Release notes. Empty when the upstream has none.
    pub body: String,
    pub is_draft: bool,
    pub is_prerelease: bool,
    /// Upstream creation timestamp, passed through verbatim.
    pub created_at: String,
    /// Upstream publication timestamp, passed through verbatim. Empty
    /// while a release is an unpublished draft.
    pub published_at: String,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub content_type: String,
    pub download_url: String,
}

/// A release together with its assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub metadata: ReleaseMetadata,
    pub assets: Vec<Asset>,
}

/// One contributor of a repository, in upstream ranking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub avatar_url: String,
    pub profile_url: String,
    pub contribution_count: u64,
}

/// A public member of the owning organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub login: String,
    pub avatar_url: String,
    pub profile_url: String,
}

/// Selects which release of a repository an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelector {
    /// The newest release; the dev flag decides between the latest
    /// stable release and the latest prerelease.
    Latest,
    /// A release carrying this exact tag.
    Tag(String),
}

impl std::str::FromStr for TagSelector {
    type Err = std::convert::Infallible;

    /// The literal `latest` (case-sensitive) is a reserved sentinel;
    /// every other string names a tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "latest" => TagSelector::Latest,
            tag => TagSelector::Tag(tag.to_string()),
        })
    }
}

impl std::fmt::Display for TagSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagSelector::Latest => f.write_str("latest"),
            TagSelector::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Read operations a release-hosting backend provides.
///
/// One implementor exists per hosting provider. The aggregate layer and
/// any embedding server talk to this trait, so tests can substitute a
/// mock for the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Lists releases in the order the upstream returns them, newest
    /// first. `per_page` and `page` fall back to the upstream defaults
    /// (30 per page, first page) when absent.
    async fn list_releases(
        &self,
        repository: &Repository,
        per_page: Option<u32>,
        page: Option<u32>,
    ) -> Result<Vec<Release>, BackendError>;

    /// Fetches the release carrying an exact tag.
    async fn release_by_tag(
        &self,
        repository: &Repository,
        tag: &str,
    ) -> Result<Release, BackendError>;

    /// Fetches the latest stable release. Prereleases and drafts never
    /// qualify.
    async fn latest_release(&self, repository: &Repository) -> Result<Release, BackendError>;

    /// Derives the newest prerelease from the repository's most recent
    /// releases. Fails with [`BackendError::NotFound`] when none of them
    /// is a prerelease.
    async fn latest_prerelease(&self, repository: &Repository) -> Result<Release, BackendError>;

    /// Lists contributors as the upstream ranks them.
    async fn contributors(
        &self,
        repository: &Repository,
    ) -> Result<Vec<Contributor>, BackendError>;

    /// Lists the public members of the organization owning the
    /// repository.
    async fn team_members(
        &self,
        repository: &Repository,
    ) -> Result<Vec<TeamMember>, BackendError>;

    /// Downloads the machine-readable patch index attached to the
    /// selected release and parses it into untyped JSON entries.
    async fn patches(
        &self,
        repository: &Repository,
        selector: &TagSelector,
        dev: bool,
    ) -> Result<Vec<serde_json::Value>, BackendError>;
}

/// Resolves a selector to a concrete release. An exact tag wins
/// regardless of `dev`; `Latest` picks the latest prerelease when `dev`
/// is set and the latest stable release otherwise.
pub async fn resolve_release(
    backend: &dyn Backend,
    repository: &Repository,
    selector: &TagSelector,
    dev: bool,
) -> Result<Release, BackendError> {
    match selector {
        TagSelector::Tag(tag) => backend.release_by_tag(repository, tag).await,
        TagSelector::Latest if dev => backend.latest_prerelease(repository).await,
        TagSelector::Latest => backend.latest_release(repository).await,
    }
}
