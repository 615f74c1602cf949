//! Request aggregate
//!
//! Requests are written once by a caseworker, resolved once by an
//! administrator, and otherwise immutable. Older documents stored a flat
//! `items` array; loading normalizes both shapes into `families`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FulfillmentError, Result};

/// Caseworker snapshot taken at submission time, not a live reference
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caseworker {
    pub name: String,
    pub email: String,
    pub uid: String,
}

impl Caseworker {
    /// Display name falling back to the email address
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub client_name: String,
    pub items: Vec<RequestItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub status: RequestStatus,
    pub caseworker: Caseworker,
    pub submitted_at: DateTime<Utc>,
    pub families: Vec<Family>,
    /// Set exactly once, on approval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_items: Option<Vec<RequestItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Wire shapes a stored request can take: the newer multi-family form or
/// the legacy flat item list.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RequestItemsShape {
    Grouped { families: Vec<Family> },
    Flat { items: Vec<RequestItem> },
}

/// Raw request document as read back from the store
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDocument {
    pub id: String,
    pub status: RequestStatus,
    pub caseworker: Caseworker,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub shape: RequestItemsShape,
    #[serde(default)]
    pub delivered_items: Option<Vec<RequestItem>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(RequestDocument::deserialize(deserializer)?.into())
    }
}

impl From<RequestDocument> for Request {
    fn from(doc: RequestDocument) -> Self {
        let families = match doc.shape {
            RequestItemsShape::Grouped { families } => families,
            // Legacy flat docs become a single family under the caseworker's name
            RequestItemsShape::Flat { items } => vec![Family {
                client_name: doc.caseworker.label().to_string(),
                items,
                notes: None,
            }],
        };
        Self {
            id: doc.id,
            status: doc.status,
            caseworker: doc.caseworker,
            submitted_at: doc.submitted_at,
            families,
            delivered_items: doc.delivered_items,
            resolved_at: doc.resolved_at,
        }
    }
}

impl Request {
    pub fn new(caseworker: Caseworker, families: Vec<Family>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: RequestStatus::Pending,
            caseworker,
            submitted_at: Utc::now(),
            families,
            delivered_items: None,
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// All requested items across families, in order
    pub fn flattened_items(&self) -> Vec<RequestItem> {
        self.families
            .iter()
            .flat_map(|family| family.items.iter().cloned())
            .collect()
    }

    /// pending -> approved, recording what was actually delivered
    pub fn approve(&mut self, delivered: Vec<RequestItem>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(FulfillmentError::AlreadyResolved(self.status));
        }
        self.status = RequestStatus::Approved;
        self.delivered_items = Some(delivered);
        self.resolved_at = Some(Utc::now());
        Ok(())
    }

    /// pending -> rejected; no inventory effect
    pub fn reject(&mut self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(FulfillmentError::AlreadyResolved(self.status));
        }
        self.status = RequestStatus::Rejected;
        self.resolved_at = Some(Utc::now());
        Ok(())
    }
}
