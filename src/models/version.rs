//! Version model and endpoint functions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::{EvgError, Result};
use crate::pagination::QueryParams;
use crate::traits::Get;

/// Status of a version that finished with failures.
pub const VERSION_STATUS_FAILED: &str = "failed";
/// Status of a version whose builds all succeeded.
pub const VERSION_STATUS_SUCCESS: &str = "success";
/// Status of a version that has been created but not started.
pub const VERSION_STATUS_CREATED: &str = "created";

/// What triggered the creation of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requester {
    PatchRequest,
    GitterRequest,
    GithubPullRequest,
    MergeTest,
    AdHoc,
    TriggerRequest,
    #[serde(other)]
    Unknown,
}

impl Requester {
    /// The value Evergreen uses for this requester in query parameters.
    pub fn evg_value(&self) -> &'static str {
        match self {
            Requester::PatchRequest => "patch_request",
            Requester::GitterRequest => "gitter_request",
            Requester::GithubPullRequest => "github_pull_request",
            Requester::MergeTest => "merge_test",
            Requester::AdHoc => "ad_hoc",
            Requester::TriggerRequest => "trigger_request",
            Requester::Unknown => "unknown",
        }
    }

    /// The value the stats endpoints use for this requester.
    pub fn stats_value(&self) -> &'static str {
        match self {
            Requester::PatchRequest => "patch",
            Requester::GitterRequest => "mainline",
            Requester::GithubPullRequest => "patch",
            Requester::MergeTest => "",
            Requester::AdHoc => "adhoc",
            Requester::TriggerRequest => "trigger",
            Requester::Unknown => "",
        }
    }

    /// Whether this requester describes a patch-like version.
    pub fn is_patch(&self) -> bool {
        matches!(
            self,
            Requester::PatchRequest | Requester::GithubPullRequest | Requester::MergeTest
        )
    }
}

/// Status of one build variant within a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildVariantStatus {
    pub build_variant: String,
    pub build_id: String,
}

/// An Evergreen version: one revision's set of builds across variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub version_id: String,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub revision: String,

    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_email: String,

    #[serde(default)]
    pub message: String,

    pub status: String,

    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,

    #[serde(default)]
    pub errors: Vec<String>,

    #[serde(default)]
    pub ignored: bool,

    #[serde(default)]
    pub requester: Option<Requester>,

    #[serde(default)]
    pub build_variants_status: Option<Vec<BuildVariantStatus>>,
}

impl Version {
    /// Whether this version has finished running tasks.
    pub fn is_completed(&self) -> bool {
        self.status == VERSION_STATUS_FAILED || self.status == VERSION_STATUS_SUCCESS
    }

    /// Look up the build ID of the given build variant, if present.
    pub fn build_id_for_variant(&self, variant: &str) -> Option<&str> {
        self.build_variants_status
            .as_deref()?
            .iter()
            .find(|bv| bv.build_variant == variant)
            .map(|bv| bv.build_id.as_str())
    }
}

#[async_trait]
impl Get for Version {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &EvgClient, id: String) -> Result<Self> {
        let path = format!("versions/{}", urlencoding::encode(&id));
        let response = client.get(&path).await?;
        let version: Version = response.json().await.map_err(EvgError::Http)?;
        Ok(version)
    }
}

/// Query parameters for listing a project's versions.
#[derive(Debug, Clone, Default)]
pub struct VersionListQuery {
    /// Only return versions created by this requester.
    pub requester: Option<Requester>,
    /// Page-size hint; the fetcher's default limit applies when unset.
    pub limit: Option<u32>,
}

impl VersionListQuery {
    fn into_params(self) -> Option<QueryParams> {
        let mut params = QueryParams::new();
        if let Some(requester) = self.requester {
            params.push(("requester".to_string(), requester.evg_value().to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if params.is_empty() {
            None
        } else {
            Some(params)
        }
    }
}

/// Stream the versions of a project, most recent first.
///
/// # Arguments
///
/// * `client` - The Evergreen API client
/// * `project_id` - The project whose versions to fetch
/// * `query` - Query parameters for filtering
pub fn versions_by_project(
    client: &EvgClient,
    project_id: &str,
    query: VersionListQuery,
) -> Result<impl Stream<Item = Result<Version>> + Send + Unpin> {
    let url = client.url_v2(&format!(
        "projects/{}/versions",
        urlencoding::encode(project_id)
    ))?;
    Ok(client.paginate_as(url, query.into_params()))
}
