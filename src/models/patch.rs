//! Patch model and endpoint functions.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::{EvgError, Result};
use crate::pagination::QueryParams;
use crate::traits::Get;

/// GitHub pull-request data attached to a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubPatchData {
    #[serde(default)]
    pub pr_number: u64,
    #[serde(default)]
    pub base_owner: String,
    #[serde(default)]
    pub base_repo: String,
    #[serde(default)]
    pub head_owner: String,
    #[serde(default)]
    pub head_repo: String,
    #[serde(default)]
    pub head_hash: String,
    #[serde(default)]
    pub author: String,
}

/// The tasks selected for one build variant of a patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsTasks {
    pub name: String,
    #[serde(default)]
    pub tasks: HashSet<String>,
}

/// An Evergreen patch: an uncommitted change submitted for testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub patch_id: String,

    #[serde(default)]
    pub description: String,

    pub project_id: String,

    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub git_hash: String,

    #[serde(default)]
    pub patch_number: u64,

    #[serde(default)]
    pub author: String,

    /// The version created from this patch, empty until activation.
    #[serde(default)]
    pub version: String,

    pub status: String,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub builds: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,

    #[serde(default)]
    pub activated: bool,

    #[serde(default)]
    pub alias: String,

    #[serde(default)]
    pub variants_tasks: Vec<VariantsTasks>,

    #[serde(default)]
    pub github_patch_data: GithubPatchData,
}

impl Patch {
    /// The tasks selected for the given build variant, if any.
    pub fn task_list_for_variant(&self, variant: &str) -> Option<&HashSet<String>> {
        self.variants_tasks
            .iter()
            .find(|vt| vt.name == variant)
            .map(|vt| &vt.tasks)
    }
}

impl std::fmt::Display for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.patch_id, self.description)
    }
}

#[async_trait]
impl Get for Patch {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &EvgClient, id: String) -> Result<Self> {
        let path = format!("patches/{}", urlencoding::encode(&id));
        let response = client.get(&path).await?;
        let patch: Patch = response.json().await.map_err(EvgError::Http)?;
        Ok(patch)
    }
}

/// Query parameters for listing a project's patches.
#[derive(Debug, Clone, Default)]
pub struct PatchListQuery {
    /// Page-size hint; the fetcher's default limit applies when unset.
    pub limit: Option<u32>,
}

impl PatchListQuery {
    fn into_params(self) -> Option<QueryParams> {
        self.limit
            .map(|limit| vec![("limit".to_string(), limit.to_string())])
    }
}

/// Stream the patches of a project, most recent first.
///
/// # Arguments
///
/// * `client` - The Evergreen API client
/// * `project_id` - The project whose patches to fetch
/// * `query` - Query parameters for filtering
pub fn patches_by_project(
    client: &EvgClient,
    project_id: &str,
    query: PatchListQuery,
) -> Result<impl Stream<Item = Result<Patch>> + Send + Unpin> {
    let url = client.url_v2(&format!(
        "projects/{}/patches",
        urlencoding::encode(project_id)
    ))?;
    Ok(client.paginate_as(url, query.into_params()))
}
