//! In-memory repository implementations
//!
//! Back the dev portal and the test suite; writers are serialized by the
//! lock, which keeps multi-step workflow tests deterministic.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use care_common::RepositoryError;

use crate::inventory::InventoryItem;
use crate::ports::{InventoryRepository, RequestRepository};
use crate::request::{Request, RequestStatus};

#[derive(Default)]
pub struct InMemoryInventoryRepository {
    items: RwLock<HashMap<String, InventoryItem>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<InventoryItem>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.items.write();
            for item in items {
                map.insert(item.id.clone(), item);
            }
        }
        repo
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<InventoryItem>, RepositoryError> {
        Ok(self.items.read().get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        let mut items: Vec<InventoryItem> = self.items.read().values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn save(&self, item: &InventoryItem) -> Result<(), RepositoryError> {
        self.items.write().insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.items.write().remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), RepositoryError> {
        self.items.write().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRequestRepository {
    requests: RwLock<HashMap<String, Request>>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Request>, RepositoryError> {
        Ok(self.requests.read().get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Request>, RepositoryError> {
        let mut requests: Vec<Request> = self.requests.read().values().cloned().collect();
        requests.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(requests)
    }

    async fn list_by_status(&self, status: RequestStatus) -> Result<Vec<Request>, RepositoryError> {
        let mut requests: Vec<Request> = self
            .requests
            .read()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(requests)
    }

    async fn save(&self, request: &Request) -> Result<(), RepositoryError> {
        self.requests
            .write()
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.requests.write().remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Caseworker, Family, RequestItem};

    fn sample_request() -> Request {
        Request::new(
            Caseworker {
                name: "Dana Reyes".into(),
                email: "dana@example.org".into(),
                uid: "cw-1".into(),
            },
            vec![Family {
                client_name: "Smith".into(),
                items: vec![RequestItem {
                    name: "Winter Coat".into(),
                    quantity: 1,
                    notes: None,
                }],
                notes: None,
            }],
        )
    }

    #[tokio::test]
    async fn test_inventory_save_and_find() {
        let repo = InMemoryInventoryRepository::new();
        let item = InventoryItem::new("Winter Coat", None, "Clothing", None, 12);
        repo.save(&item).await.unwrap();

        let found = repo.find_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Winter Coat");
        assert_eq!(repo.list_all().await.unwrap().len(), 1);

        repo.delete_all().await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_list_by_status() {
        let repo = InMemoryRequestRepository::new();
        let pending = sample_request();
        let mut rejected = sample_request();
        rejected.reject().unwrap();
        repo.save(&pending).await.unwrap();
        repo.save(&rejected).await.unwrap();

        let found = repo.list_by_status(RequestStatus::Pending).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, pending.id);
    }

    #[tokio::test]
    async fn test_request_delete() {
        let repo = InMemoryRequestRepository::new();
        let request = sample_request();
        repo.save(&request).await.unwrap();
        repo.delete(&request.id).await.unwrap();
        assert!(repo.find_by_id(&request.id).await.unwrap().is_none());
    }
}
