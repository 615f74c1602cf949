//! Data Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use care_fulfillment::{DeliveryLine, Family, InventoryItem, RequestStatus};

/// User record as exposed by the user-management endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalUser {
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAdminRequest {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    pub families: Vec<Family>,
}

/// PATCH body for the request review screen
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatusBody {
    pub status: RequestStatus,
    #[serde(default)]
    pub delivered_items: Option<Vec<DeliveryLine>>,
}

/// Query filters for the inventory list
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: u32,
    pub category: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Seed data for the dev portal
pub fn seed_users() -> Vec<PortalUser> {
    vec![
        PortalUser {
            uid: Uuid::new_v4().to_string(),
            email: "admin@opencare.org".into(),
            display_name: Some("Site Admin".into()),
            is_admin: true,
        },
        PortalUser {
            uid: Uuid::new_v4().to_string(),
            email: "dana@opencare.org".into(),
            display_name: Some("Dana Reyes".into()),
            is_admin: false,
        },
    ]
}

pub fn seed_inventory() -> Vec<InventoryItem> {
    vec![
        InventoryItem::new(
            "Winter Coat",
            Some("Adult Large".into()),
            "Clothing",
            Some("Main Warehouse".into()),
            12,
        ),
        InventoryItem::new("Rice 5lb", None, "Food", Some("Pantry".into()), 40),
        InventoryItem::new("Soap", Some("Bar".into()), "Hygiene", None, 25),
    ]
}
