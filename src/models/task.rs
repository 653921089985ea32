//! Task model and endpoint functions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::{EvgError, Result};
use crate::pagination::QueryParams;
use crate::traits::Get;

/// An artifact attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub ignore_for_fetch: bool,
}

/// Details about how a task finished.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusDetails {
    #[serde(default)]
    pub status: String,
    /// Failure type reported by the agent (e.g. "test", "system", "setup").
    #[serde(rename = "type", default)]
    pub status_type: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub timed_out: bool,
}

/// An Evergreen task: one unit of work within a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,

    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub activated_by: String,

    #[serde(default)]
    pub artifacts: Vec<Artifact>,

    pub build_id: String,
    pub build_variant: String,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dispatch_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ingest_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub depends_on: Vec<serde_json::Value>,

    pub display_name: String,

    #[serde(default)]
    pub display_only: bool,

    #[serde(default)]
    pub distro_id: String,

    #[serde(default)]
    pub est_wait_to_start_ms: u64,
    #[serde(default)]
    pub expected_duration_ms: u64,

    /// Which execution of this task this record describes (0-indexed).
    #[serde(default)]
    pub execution: u32,

    #[serde(default)]
    pub generate_task: bool,
    #[serde(default)]
    pub generated_by: String,

    #[serde(default)]
    pub host_id: String,

    /// Links to the task's log files, keyed by log name.
    #[serde(default)]
    pub logs: HashMap<String, Option<String>>,

    #[serde(default)]
    pub mainline: bool,

    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub restarts: u32,

    #[serde(default)]
    pub revision: String,

    pub status: String,

    #[serde(default)]
    pub status_details: StatusDetails,

    #[serde(default)]
    pub task_group: String,
    #[serde(default)]
    pub task_group_max_hosts: u32,

    #[serde(default)]
    pub time_taken_ms: u64,

    #[serde(default)]
    pub version_id: String,
}

#[async_trait]
impl Get for Task {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &EvgClient, id: String) -> Result<Self> {
        let path = format!("tasks/{}", urlencoding::encode(&id));
        let response = client.get(&path).await?;
        let task: Task = response.json().await.map_err(EvgError::Http)?;
        Ok(task)
    }
}

/// Query parameters for listing a build's tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    /// Include every execution of each task, not just the latest.
    pub fetch_all_executions: bool,
    /// Page-size hint; the fetcher's default limit applies when unset.
    pub limit: Option<u32>,
}

impl TaskListQuery {
    fn into_params(self) -> Option<QueryParams> {
        let mut params = QueryParams::new();
        if self.fetch_all_executions {
            params.push(("fetch_all_executions".to_string(), "1".to_string()));
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

/// Stream the tasks of a build, in server order.
///
/// # Arguments
///
/// * `client` - The Evergreen API client
/// * `build_id` - The build whose tasks to fetch
/// * `query` - Query parameters for filtering
///
/// # Example
///
/// ```no_run
/// use evgapi::{tasks_by_build, EvgClient, TaskListQuery};
/// use futures::TryStreamExt;
///
/// # async fn example() -> evgapi::Result<()> {
/// let client = EvgClient::from_env()?;
/// let mut tasks = tasks_by_build(&client, "build123", TaskListQuery::default())?;
/// while let Some(task) = tasks.try_next().await? {
///     println!("{}: {}", task.display_name, task.status);
/// }
/// # Ok(())
/// # }
/// ```
pub fn tasks_by_build(
    client: &EvgClient,
    build_id: &str,
    query: TaskListQuery,
) -> Result<impl Stream<Item = Result<Task>> + Send + Unpin> {
    let url = client.url_v2(&format!("builds/{}/tasks", urlencoding::encode(build_id)))?;
    Ok(client.paginate_as(url, query.into_params()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserialize() {
        let json = serde_json::json!({
            "task_id": "mongodb_lint_abc123",
            "build_id": "mongodb_enterprise_rhel_abc123",
            "build_variant": "enterprise-rhel",
            "display_name": "lint",
            "status": "success",
            "execution": 1,
            "artifacts": [
                {"name": "logs", "url": "https://example.com/logs", "visibility": "public",
                 "ignore_for_fetch": false}
            ],
            "logs": {"task_log": "https://example.com/task_log"},
            "status_details": {"status": "success", "type": "test", "desc": "", "timed_out": false},
            "time_taken_ms": 12345
        });
        let task: Task = serde_json::from_value(json).expect("Failed to deserialize");
        assert_eq!(task.task_id, "mongodb_lint_abc123");
        assert_eq!(task.execution, 1);
        assert_eq!(task.artifacts[0].name, "logs");
        assert_eq!(
            task.logs.get("task_log").and_then(|l| l.as_deref()),
            Some("https://example.com/task_log")
        );
        assert!(!task.status_details.timed_out);
    }

    #[test]
    fn test_task_minimal_fields() {
        let json = serde_json::json!({
            "task_id": "t1",
            "build_id": "b1",
            "build_variant": "bv",
            "display_name": "compile",
            "status": "undispatched"
        });
        let task: Task = serde_json::from_value(json).expect("Failed to deserialize");
        assert!(task.artifacts.is_empty());
        assert!(task.start_time.is_none());
        assert_eq!(task.status_details.status, "");
    }

    #[test]
    fn test_task_list_query_params() {
        assert!(TaskListQuery::default().into_params().is_none());

        let params = TaskListQuery {
            fetch_all_executions: true,
            limit: None,
        }
        .into_params()
        .unwrap();
        assert_eq!(
            params,
            vec![("fetch_all_executions".to_string(), "1".to_string())]
        );

        let params = TaskListQuery {
            fetch_all_executions: false,
            limit: Some(25),
        }
        .into_params()
        .unwrap();
        assert_eq!(params, vec![("limit".to_string(), "25".to_string())]);
    }
}
