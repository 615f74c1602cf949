//! API Handlers

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use care_common::Role;
use care_forms::{FormConfig, FormsError, SaveFormConfig};
use care_fulfillment::{
    compute_stats, filter_items, import_inventory_csv, DashboardStats, DeliveryLine,
    FulfillmentError, InventoryItem, InventoryRepository, Request, RequestRepository,
    RequestStatus,
};

use crate::auth::{authenticate, create_token, require_admin};
use crate::models::*;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn status_only(status: StatusCode) -> ApiError {
    error(status, status.canonical_reason().unwrap_or("error"))
}

fn fulfillment_error(err: FulfillmentError) -> ApiError {
    let status = match &err {
        FulfillmentError::RequestNotFound(_) => StatusCode::NOT_FOUND,
        FulfillmentError::ItemNotFound(_)
        | FulfillmentError::InsufficientStock { .. }
        | FulfillmentError::InvalidQuantity { .. }
        | FulfillmentError::AlreadyResolved(_)
        | FulfillmentError::EmptyRequest => StatusCode::BAD_REQUEST,
        FulfillmentError::Unauthorized => StatusCode::FORBIDDEN,
        FulfillmentError::Storage(_) => StatusCode::BAD_GATEWAY,
        FulfillmentError::PartialWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, err.to_string())
}

fn forms_error(err: FormsError) -> ApiError {
    let status = match &err {
        FormsError::FieldNotFound(_) => StatusCode::NOT_FOUND,
        FormsError::Storage(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    };
    error(status, err.to_string())
}

// Auth

pub async fn issue_token(
    State(state): State<AppState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let users = state.users.read().await;
    let user = users
        .iter()
        .find(|u| u.email == body.email)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Unknown user"))?;
    let role = if user.is_admin {
        Role::Admin
    } else {
        Role::Caseworker
    };
    let token = create_token(&user.uid, &user.email, user.display_name.as_deref(), role)
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(TokenResponse { token }))
}

// Users

pub async fn list_users(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<PortalUser>>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let users = state.users.read().await;
    Ok(Json(users.clone()))
}

pub async fn create_user(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PortalUser>), ApiError> {
    require_admin(&headers).map_err(status_only)?;
    if body.email.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Email is required"));
    }
    let user = PortalUser {
        uid: Uuid::new_v4().to_string(),
        email: body.email,
        display_name: body.name,
        is_admin: body.is_admin,
    };
    state.users.write().await.push(user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete_user(
    headers: HeaderMap,
    Path(uid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let mut users = state.users.write().await;
    let before = users.len();
    users.retain(|u| u.uid != uid);
    if users.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "User not found"));
    }
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}

pub async fn toggle_admin(
    headers: HeaderMap,
    Path(uid): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<ToggleAdminRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let mut users = state.users.write().await;
    let user = users
        .iter_mut()
        .find(|u| u.uid == uid)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))?;
    user.is_admin = body.is_admin;
    Ok(Json(MessageResponse {
        message: "Admin status updated successfully".into(),
    }))
}

pub async fn set_admin_by_email(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<SetAdminRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    if body.email.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Email is required"));
    }
    let mut users = state.users.write().await;
    let user = users
        .iter_mut()
        .find(|u| u.email == body.email)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))?;
    user.is_admin = true;
    Ok(Json(MessageResponse {
        message: format!("Success! {} has been set as an admin.", body.email),
    }))
}

// Requests

pub async fn submit_request(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<SubmitRequestBody>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    let principal = authenticate(&headers).map_err(status_only)?;
    let request = state
        .fulfillment
        .submit_request(&principal, body.families)
        .await
        .map_err(fulfillment_error)?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<Request>>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let requests = state
        .requests
        .list_all()
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(requests))
}

pub async fn open_review(
    headers: HeaderMap,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryLine>>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let request = state
        .requests
        .find_by_id(&id)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Request not found"))?;
    Ok(Json(state.fulfillment.open_approval_review(&request)))
}

pub async fn update_request_status(
    headers: HeaderMap,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateRequestStatusBody>,
) -> Result<Response, ApiError> {
    let principal = require_admin(&headers).map_err(status_only)?;
    match body.status {
        RequestStatus::Approved => {
            let lines = match body.delivered_items {
                Some(lines) => lines,
                None => {
                    // No explicit delivery list: derive one from the request
                    let request = state
                        .requests
                        .find_by_id(&id)
                        .await
                        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?
                        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Request not found"))?;
                    state.fulfillment.open_approval_review(&request)
                }
            };
            let receipt = state
                .fulfillment
                .approve_with_delivery(&principal, &id, lines)
                .await
                .map_err(fulfillment_error)?;
            Ok(Json(receipt).into_response())
        }
        RequestStatus::Rejected => {
            state
                .fulfillment
                .reject(&principal, &id)
                .await
                .map_err(fulfillment_error)?;
            Ok(Json(MessageResponse {
                message: "Request status updated successfully".into(),
            })
            .into_response())
        }
        RequestStatus::Pending => Err(error(StatusCode::BAD_REQUEST, "Invalid status")),
    }
}

pub async fn delete_request(
    headers: HeaderMap,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let principal = require_admin(&headers).map_err(status_only)?;
    state
        .fulfillment
        .delete_request(&principal, &id)
        .await
        .map_err(fulfillment_error)?;
    Ok(Json(MessageResponse {
        message: "Request deleted successfully".into(),
    }))
}

// Inventory

pub async fn list_inventory(
    headers: HeaderMap,
    Query(query): Query<InventoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let items = state
        .inventory
        .list_all()
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    let filtered = filter_items(
        &items,
        query.search.as_deref().unwrap_or(""),
        query.category.as_deref(),
        query.location.as_deref(),
    )
    .into_iter()
    .cloned()
    .collect();
    Ok(Json(filtered))
}

pub async fn create_inventory_item(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<InventoryItemBody>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let item = InventoryItem::new(
        body.name,
        body.description,
        body.category,
        body.location,
        body.quantity,
    );
    state
        .inventory
        .save(&item)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_inventory_item(
    headers: HeaderMap,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<InventoryItemBody>,
) -> Result<Json<InventoryItem>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let mut item = state
        .inventory
        .find_by_id(&id)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Item not found"))?;
    item.update_details(
        body.name,
        body.description,
        body.category,
        body.location,
        body.quantity,
    );
    state
        .inventory
        .save(&item)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(item))
}

pub async fn delete_inventory_item(
    headers: HeaderMap,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    state
        .inventory
        .delete(&id)
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_all_inventory(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    state
        .inventory
        .delete_all()
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(MessageResponse {
        message: "All inventory items deleted".into(),
    }))
}

pub async fn import_inventory(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let outcome = import_inventory_csv(state.inventory.as_ref(), &body)
        .await
        .map_err(fulfillment_error)?;
    Ok(Json(MessageResponse {
        message: format!(
            "Imported {} items ({} rows skipped)",
            outcome.imported, outcome.skipped
        ),
    }))
}

// Dashboard

pub async fn dashboard_stats(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let requests = state
        .requests
        .list_all()
        .await
        .map_err(|e| error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    let total_users = state.users.read().await.len();
    Ok(Json(compute_stats(
        &requests,
        total_users,
        chrono::Utc::now(),
    )))
}

// Form configuration

pub async fn get_form_config(State(state): State<AppState>) -> Json<FormConfig> {
    // Fail-soft: the intake form and the editor both open on the default
    Json(state.forms.load_or_default().await)
}

pub async fn save_form_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<SaveFormConfig>,
) -> Result<Json<FormConfig>, ApiError> {
    require_admin(&headers).map_err(status_only)?;
    let config = state.forms.save(body).await.map_err(forms_error)?;
    Ok(Json(config))
}
