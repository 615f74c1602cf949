//! Outbound ports to the document store
//!
//! The hosted store itself is an external collaborator; these traits are
//! the seam the workflow code talks through.

use async_trait::async_trait;

use care_common::RepositoryError;

use crate::inventory::InventoryItem;
use crate::request::{Request, RequestStatus};

/// `inventory` collection port
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<InventoryItem>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<InventoryItem>, RepositoryError>;

    /// Insert or update
    async fn save(&self, item: &InventoryItem) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Remove every item (admin bulk reset)
    async fn delete_all(&self) -> Result<(), RepositoryError>;
}

/// `requests` collection port
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Request>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<Request>, RepositoryError>;

    async fn list_by_status(&self, status: RequestStatus) -> Result<Vec<Request>, RepositoryError>;

    /// Insert or update
    async fn save(&self, request: &Request) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}
