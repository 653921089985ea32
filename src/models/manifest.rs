//! Manifest model.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::EvgClient;
use crate::error::{EvgError, Result};
use crate::traits::Get;

/// A module pinned in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestModule {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub url: String,
}

/// The module manifest of a version: the exact revisions of every associated
/// repository the version was built against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,

    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub branch: String,

    /// Pinned modules keyed by module name.
    #[serde(default)]
    pub modules: HashMap<String, ManifestModule>,
}

#[async_trait]
impl Get for Manifest {
    /// The ID of the patch whose manifest to fetch.
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &EvgClient, patch_id: String) -> Result<Self> {
        let path = format!("patches/{}/manifest", urlencoding::encode(&patch_id));
        let response = client.get(&path).await?;
        let manifest: Manifest = response.json().await.map_err(EvgError::Http)?;
        Ok(manifest)
    }
}
