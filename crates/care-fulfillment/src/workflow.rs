//! Fulfillment workflow
//!
//! Approval is the one transaction-like flow in the portal: every delivery
//! line is resolved and validated against current stock before the first
//! write. The underlying store offers no multi-document transaction, so a
//! failure between the request update and the inventory updates surfaces
//! as a partial write for manual reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use care_common::Principal;

use crate::inventory::InventoryItem;
use crate::ports::{InventoryRepository, RequestRepository};
use crate::receipt::{generate_receipt, Receipt};
use crate::request::{Caseworker, Family, Request, RequestItem};
use crate::{FulfillmentError, Result};

/// Editable delivery line shown in the approval review
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLine {
    pub name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<RequestItem> for DeliveryLine {
    fn from(item: RequestItem) -> Self {
        Self {
            name: item.name,
            quantity: item.quantity,
            category: None,
            location: None,
            notes: item.notes,
        }
    }
}

pub struct FulfillmentService {
    inventory: Arc<dyn InventoryRepository>,
    requests: Arc<dyn RequestRepository>,
}

impl FulfillmentService {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        requests: Arc<dyn RequestRepository>,
    ) -> Self {
        Self {
            inventory,
            requests,
        }
    }

    /// Caseworker submission: validate every line against current stock,
    /// then store the request as pending with a caseworker snapshot.
    pub async fn submit_request(
        &self,
        principal: &Principal,
        families: Vec<Family>,
    ) -> Result<Request> {
        if families.iter().all(|f| f.items.is_empty()) {
            return Err(FulfillmentError::EmptyRequest);
        }

        let stock = self.inventory.list_all().await?;
        for family in &families {
            for item in &family.items {
                let matched = stock
                    .iter()
                    .find(|inv| inv.matches(&item.name, None, None))
                    .ok_or_else(|| FulfillmentError::ItemNotFound(item.name.clone()))?;
                if item.quantity < 1 || item.quantity > matched.quantity {
                    return Err(FulfillmentError::InvalidQuantity {
                        name: matched.name.clone(),
                        requested: item.quantity,
                        available: matched.quantity,
                    });
                }
            }
        }

        let caseworker = Caseworker {
            name: principal.label().to_string(),
            email: principal.email.clone(),
            uid: principal.uid.to_string(),
        };
        let request = Request::new(caseworker, families);
        self.requests.save(&request).await?;
        tracing::info!(request_id = %request.id, "request submitted");
        Ok(request)
    }

    /// pending -> rejected; never touches inventory.
    pub async fn reject(&self, principal: &Principal, request_id: &str) -> Result<Request> {
        if !principal.is_admin() {
            return Err(FulfillmentError::Unauthorized);
        }
        let mut request = self.load_request(request_id).await?;
        request.reject()?;
        self.requests.save(&request).await?;
        tracing::info!(request_id, "request rejected");
        Ok(request)
    }

    /// Derive the editable delivery lines for the approval review.
    ///
    /// Priority: already-recorded delivered items, then the request's own
    /// items; always at least one placeholder line.
    pub fn open_approval_review(&self, request: &Request) -> Vec<DeliveryLine> {
        let items = match &request.delivered_items {
            Some(delivered) if !delivered.is_empty() => delivered.clone(),
            _ => request.flattened_items(),
        };
        if items.is_empty() {
            return vec![DeliveryLine {
                name: String::new(),
                quantity: 1,
                category: None,
                location: None,
                notes: None,
            }];
        }
        items.into_iter().map(DeliveryLine::from).collect()
    }

    /// Approve a pending request and consume inventory.
    ///
    /// Validation is front-loaded and exhaustive: no write happens until
    /// every line has resolved to an item with sufficient stock.
    pub async fn approve_with_delivery(
        &self,
        principal: &Principal,
        request_id: &str,
        lines: Vec<DeliveryLine>,
    ) -> Result<Receipt> {
        if !principal.is_admin() {
            return Err(FulfillmentError::Unauthorized);
        }
        if lines.is_empty() {
            return Err(FulfillmentError::EmptyRequest);
        }
        let mut request = self.load_request(request_id).await?;
        if !request.is_pending() {
            return Err(FulfillmentError::AlreadyResolved(request.status));
        }

        let stock = self.inventory.list_all().await?;

        // Resolve every line and accumulate per-item totals so repeated
        // lines against one item are validated together.
        let mut totals: HashMap<String, u32> = HashMap::new();
        for line in &lines {
            let item = resolve_line(&stock, line)
                .ok_or_else(|| FulfillmentError::ItemNotFound(line.name.clone()))?;
            *totals.entry(item.id.clone()).or_insert(0) += line.quantity;
        }

        let mut updates: Vec<InventoryItem> = Vec::with_capacity(totals.len());
        for item in &stock {
            if let Some(&requested) = totals.get(&item.id) {
                if requested > item.quantity {
                    return Err(FulfillmentError::InsufficientStock {
                        name: item.name.clone(),
                        requested,
                        available: item.quantity,
                    });
                }
                let mut updated = item.clone();
                updated.consume(requested)?;
                updates.push(updated);
            }
        }

        // All lines validated; commit. The request update and the N
        // inventory updates are separate writes with no transaction.
        let delivered: Vec<RequestItem> = lines
            .into_iter()
            .map(|line| RequestItem {
                name: line.name,
                quantity: line.quantity,
                notes: line.notes,
            })
            .collect();
        request.approve(delivered.clone())?;

        let total_writes = 1 + updates.len();
        // If the very first write fails nothing has committed yet; that is
        // a clean abort, not a partial write.
        self.requests.save(&request).await?;

        let mut completed = 1;
        for item in &updates {
            self.inventory.save(item).await.map_err(|err| {
                tracing::error!(
                    request_id,
                    completed,
                    total = total_writes,
                    "inventory update failed mid-approval"
                );
                FulfillmentError::PartialWrite {
                    completed,
                    total: total_writes,
                    detail: err.to_string(),
                }
            })?;
            completed += 1;
        }

        tracing::info!(request_id, items = updates.len(), "request approved");
        Ok(generate_receipt(&request, &delivered))
    }

    /// Administrative removal, independent of status; no inventory effect.
    pub async fn delete_request(&self, principal: &Principal, request_id: &str) -> Result<()> {
        if !principal.is_admin() {
            return Err(FulfillmentError::Unauthorized);
        }
        self.load_request(request_id).await?;
        self.requests.delete(request_id).await?;
        tracing::info!(request_id, "request deleted");
        Ok(())
    }

    async fn load_request(&self, request_id: &str) -> Result<Request> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| FulfillmentError::RequestNotFound(request_id.to_string()))
    }
}

/// Resolve a delivery line against the stock snapshot: exact
/// (name, category, location) match first, name-only fallback when the
/// filters are unset or match nothing.
fn resolve_line<'a>(stock: &'a [InventoryItem], line: &DeliveryLine) -> Option<&'a InventoryItem> {
    if line.category.is_some() || line.location.is_some() {
        if let Some(item) = stock.iter().find(|item| {
            item.matches(&line.name, line.category.as_deref(), line.location.as_deref())
        }) {
            return Some(item);
        }
    }
    stock.iter().find(|item| item.matches(&line.name, None, None))
}
