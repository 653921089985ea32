//! Test result model and endpoint functions.

use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::Result;
use crate::pagination::QueryParams;

/// A log attached to a test result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestLog {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_raw: String,
    #[serde(default)]
    pub line_num: u64,
    #[serde(default)]
    pub log_id: Option<String>,
}

/// The result of a single test within a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub task_id: String,
    pub status: String,
    pub test_file: String,

    #[serde(default)]
    pub exit_code: i32,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub logs: Vec<TestLog>,
}

/// Query parameters for listing a task's test results.
#[derive(Debug, Clone, Default)]
pub struct TestListQuery {
    /// Only return tests with this status (e.g. "fail").
    pub status: Option<String>,
    /// Page-size hint; the fetcher's default limit applies when unset.
    pub limit: Option<u32>,
}

impl TestListQuery {
    fn into_params(self) -> Option<QueryParams> {
        let mut params = QueryParams::new();
        if let Some(status) = self.status {
            params.push(("status".to_string(), status));
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

/// Stream the test results of a task, in server order.
///
/// # Arguments
///
/// * `client` - The Evergreen API client
/// * `task_id` - The task whose tests to fetch
/// * `query` - Query parameters for filtering
pub fn tests_by_task(
    client: &EvgClient,
    task_id: &str,
    query: TestListQuery,
) -> Result<impl Stream<Item = Result<TestResult>> + Send + Unpin> {
    let url = client.url_v2(&format!("tasks/{}/tests", urlencoding::encode(task_id)))?;
    Ok(client.paginate_as(url, query.into_params()))
}
