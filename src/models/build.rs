//! Build model and endpoint functions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::{EvgError, Result};
use crate::traits::Get;

/// Status of a build that finished with at least one failed task.
pub const BUILD_STATUS_FAILED: &str = "failed";
/// Status of a build whose tasks all succeeded.
pub const BUILD_STATUS_SUCCESS: &str = "success";
/// Status of a build that has been created but not started.
pub const BUILD_STATUS_CREATED: &str = "created";

/// Task status counts for a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub started: u32,
    #[serde(default)]
    pub undispatched: u32,
    #[serde(default)]
    pub inactive: u32,
    #[serde(default)]
    pub dispatched: u32,
    #[serde(default)]
    pub timed_out: u32,
}

/// An Evergreen build: one build variant's tasks within a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    /// The build ID.
    #[serde(rename = "_id")]
    pub id: String,

    /// The project this build belongs to.
    pub project_id: String,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,

    /// The version containing this build.
    pub version: String,

    #[serde(default)]
    pub branch: String,

    /// Git revision the build was created from.
    #[serde(default)]
    pub git_hash: String,

    /// Name of the build variant.
    pub build_variant: String,

    pub status: String,

    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub activated_by: String,
    #[serde(default)]
    pub activated_time: Option<DateTime<Utc>>,

    /// Position in the project's commit order.
    #[serde(default)]
    pub order: i64,

    /// IDs of the tasks in this build.
    #[serde(default)]
    pub tasks: Vec<String>,

    #[serde(default)]
    pub time_taken_ms: u64,

    pub display_name: String,

    #[serde(default)]
    pub predicted_makespan_ms: u64,
    #[serde(default)]
    pub actual_makespan_ms: u64,

    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub status_counts: StatusCounts,
}

impl Build {
    /// Whether this build has finished running tasks.
    pub fn is_completed(&self) -> bool {
        self.status == BUILD_STATUS_FAILED || self.status == BUILD_STATUS_SUCCESS
    }
}

#[async_trait]
impl Get for Build {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &EvgClient, id: String) -> Result<Self> {
        let path = format!("builds/{}", urlencoding::encode(&id));
        let response = client.get(&path).await?;
        let build: Build = response.json().await.map_err(EvgError::Http)?;
        Ok(build)
    }
}

/// Stream the builds of a version, in server order.
///
/// # Arguments
///
/// * `client` - The Evergreen API client
/// * `version_id` - The version whose builds to fetch
///
/// # Example
///
/// ```ignore
/// use futures::TryStreamExt;
///
/// let builds: Vec<Build> = builds_by_version(&client, "version123")?
///     .try_collect()
///     .await?;
/// ```
pub fn builds_by_version(
    client: &EvgClient,
    version_id: &str,
) -> Result<impl Stream<Item = Result<Build>> + Send + Unpin> {
    let url = client.url_v2(&format!(
        "versions/{}/builds",
        urlencoding::encode(version_id)
    ))?;
    Ok(client.paginate_as(url, None))
}
