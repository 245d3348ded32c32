//! Aggregate operations preserving the legacy flat API contract.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Contributor, Release, Repository};
use crate::error::BackendError;

/// One row of the flat tools listing: a single asset of a repository's
/// latest release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    /// `owner/name` of the originating repository.
    pub repository: String,
    /// Tag of the release the asset belongs to.
    pub version: String,
    /// Publication timestamp of that release.
    pub timestamp: String,
    pub name: String,
    pub download_url: String,
    pub content_type: String,
}

/// Contributors of one repository, nested under its `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContributors {
    pub repository: String,
    pub contributors: Vec<Contributor>,
}

/// Fetches the latest release of every repository concurrently and
/// flattens the results into one row per asset. Rows stay grouped by
/// repository in input order; within a repository, assets keep their
/// upstream order. One failing repository fails the whole aggregate,
/// there is no partial result.
pub async fn tools(
    backend: &dyn Backend,
    repositories: &[Repository],
    dev: bool,
) -> Result<Vec<ToolEntry>, BackendError> {
    let releases = try_join_all(repositories.iter().map(|repository| async move {
        if dev {
            backend.latest_prerelease(repository).await
        } else {
            backend.latest_release(repository).await
        }
    }))
    .await?;

    Ok(repositories
        .iter()
        .zip(releases)
        .flat_map(|(repository, release)| flatten_release(repository, release))
        .collect())
}

fn flatten_release(repository: &Repository, release: Release) -> Vec<ToolEntry> {
    let repository = repository.to_string();
    let metadata = release.metadata;
    release
        .assets
        .into_iter()
        .map(|asset| ToolEntry {
            repository: repository.clone(),
            version: metadata.tag_name.clone(),
            timestamp: metadata.published_at.clone(),
            name: asset.name,
            download_url: asset.download_url,
            content_type: asset.content_type,
        })
        .collect()
}

/// Fetches the contributors of every repository concurrently, keeping
/// input order. One failing repository fails the whole aggregate.
pub async fn contributors(
    backend: &dyn Backend,
    repositories: &[Repository],
) -> Result<Vec<RepositoryContributors>, BackendError> {
    let fetched = try_join_all(
        repositories
            .iter()
            .map(|repository| backend.contributors(repository)),
    )
    .await?;

    Ok(repositories
        .iter()
        .zip(fetched)
        .map(|(repository, contributors)| RepositoryContributors {
            repository: repository.to_string(),
            contributors,
        })
        .collect())
}
