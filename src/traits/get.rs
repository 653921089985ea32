//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::EvgClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implement this trait for entity types that can be fetched individually
/// by a unique identifier.
///
/// # Example
///
/// ```ignore
/// use evgapi::{EvgClient, Build, Get};
///
/// let client = EvgClient::from_env()?;
/// let build = Build::get(&client, "mongodb_main_abc123".to_string()).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id;

    /// Fetch the entity by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - The Evergreen API client
    /// * `id` - The entity identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &EvgClient, id: Self::Id) -> Result<Self>;
}
