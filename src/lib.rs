//! Evergreen API client library.
//!
//! A typed, asynchronous Rust client for the Evergreen CI REST v2 API.
//! List endpoints are exposed as lazy streams that follow the server's
//! `Link: rel="next"` headers and download the next page in the background
//! while the current page is being consumed, so a paginated resource reads
//! like an ordinary sequence.
//!
//! # Quick Start
//!
//! ```no_run
//! use evgapi::{tasks_by_build, Build, EvgClient, Get, TaskListQuery};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> evgapi::Result<()> {
//!     // Create client from environment variables
//!     let client = EvgClient::from_env()?;
//!
//!     // Get a build by ID
//!     let build = Build::get(&client, "mongodb_enterprise_rhel_abc123".to_string()).await?;
//!     println!("Build: {} ({})", build.display_name, build.status);
//!
//!     // Stream every task of the build across all pages
//!     let mut tasks = tasks_by_build(&client, &build.id, TaskListQuery::default())?;
//!     while let Some(task) = tasks.try_next().await? {
//!         println!("{}: {}", task.display_name, task.status);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`EvgClient`] holds the authenticated HTTP connection and builds
//!   REST v2 URLs.
//! - [`pagination::paginate`] is the single generic fetcher behind every
//!   list endpoint; each endpoint function supplies its own record decoder.
//! - [`Get`] is implemented by entity types that can be fetched by ID.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `EVG_API_USER` (required) - Evergreen username
//! - `EVG_API_KEY` (required) - API key for that user
//! - `EVG_API_SERVER` (optional) - Base URL (defaults to
//!   `https://evergreen.mongodb.com`)

mod client;
mod error;
mod models;
pub mod pagination;
mod traits;

// Re-export core types
pub use client::{EvgAuth, EvgClient};
pub use error::{EvgError, Result};
pub use pagination::{paginate, QueryParams, DEFAULT_LIMIT};

// Re-export traits
pub use traits::Get;

// Re-export models
pub use models::{
    // Build types
    Build,
    StatusCounts,
    BUILD_STATUS_CREATED,
    BUILD_STATUS_FAILED,
    BUILD_STATUS_SUCCESS,
    // Task types
    Artifact,
    StatusDetails,
    Task,
    TaskListQuery,
    // Test types
    TestListQuery,
    TestLog,
    TestResult,
    // Version types
    BuildVariantStatus,
    Requester,
    Version,
    VersionListQuery,
    VERSION_STATUS_CREATED,
    VERSION_STATUS_FAILED,
    VERSION_STATUS_SUCCESS,
    // Patch types
    GithubPatchData,
    Patch,
    PatchListQuery,
    VariantsTasks,
    // Project types
    Project,
    ProjectCommitQueue,
    // Manifest types
    Manifest,
    ManifestModule,
};

// Re-export endpoint functions
pub use models::{
    builds_by_version, patches_by_project, tasks_by_build, tests_by_task, versions_by_project,
};
