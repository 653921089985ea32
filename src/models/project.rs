//! Project model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::{EvgError, Result};
use crate::traits::Get;

/// Commit-queue settings of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCommitQueue {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub merge_method: String,
    #[serde(default)]
    pub patch_type: String,
}

/// An Evergreen project: a tracked repository and its CI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub identifier: String,
    pub display_name: String,

    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub batch_time: u64,

    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub remote_path: String,

    #[serde(default)]
    pub tracked: bool,
    #[serde(default)]
    pub deactivated_previous: Option<bool>,

    #[serde(default)]
    pub admins: Vec<String>,

    #[serde(default)]
    pub tracks_push_events: bool,
    #[serde(default)]
    pub pr_testing_enabled: bool,

    #[serde(default)]
    pub commit_queue: ProjectCommitQueue,
}

#[async_trait]
impl Get for Project {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &EvgClient, id: String) -> Result<Self> {
        let path = format!("projects/{}", urlencoding::encode(&id));
        let response = client.get(&path).await?;
        let project: Project = response.json().await.map_err(EvgError::Http)?;
        Ok(project)
    }
}
