//! OpenCare Portal API Backend
//!
//! Rust/Axum API gateway for the case-management portal.

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use care_forms::{FormConfigService, InMemoryFormConfigRepository};
use care_fulfillment::{
    FulfillmentService, InMemoryInventoryRepository, InMemoryRequestRepository,
    InventoryRepository, RequestRepository,
};

mod auth;
mod handlers;
mod models;

use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<RwLock<Vec<models::PortalUser>>>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub forms: Arc<FormConfigService>,
    pub fulfillment: Arc<FulfillmentService>,
}

impl AppState {
    fn new() -> Self {
        let inventory: Arc<dyn InventoryRepository> = Arc::new(
            InMemoryInventoryRepository::with_items(models::seed_inventory()),
        );
        let requests: Arc<dyn RequestRepository> = Arc::new(InMemoryRequestRepository::new());
        let fulfillment = Arc::new(FulfillmentService::new(inventory.clone(), requests.clone()));
        let forms = Arc::new(FormConfigService::new(Arc::new(
            InMemoryFormConfigRepository::new(),
        )));
        Self {
            users: Arc::new(RwLock::new(models::seed_users())),
            inventory,
            requests,
            forms,
            fulfillment,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new();

    let app = Router::new()
        // Health check
        .route("/health", get(health))

        // Dev login
        .route("/api/auth/token", post(issue_token))

        // Caseworker submission
        .route("/api/requests", post(submit_request))

        // Form configuration
        .route("/api/form-config", get(get_form_config).put(save_form_config))

        // Users
        .route("/api/admin/users", get(list_users).post(create_user))
        .route("/api/admin/users/:uid", delete(delete_user))
        .route("/api/admin/users/:uid/admin", patch(toggle_admin))
        .route("/api/admin/set-admin", post(set_admin_by_email))

        // Requests
        .route("/api/admin/requests", get(list_requests))
        .route(
            "/api/admin/requests/:id",
            patch(update_request_status).delete(delete_request),
        )
        .route("/api/admin/requests/:id/review", get(open_review))

        // Inventory
        .route(
            "/api/admin/inventory",
            get(list_inventory)
                .post(create_inventory_item)
                .delete(delete_all_inventory),
        )
        .route(
            "/api/admin/inventory/:id",
            put(update_inventory_item).delete(delete_inventory_item),
        )
        .route("/api/admin/inventory/import", post(import_inventory))

        // Dashboard
        .route("/api/admin/stats", get(dashboard_stats))

        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = "0.0.0.0:8080";
    tracing::info!("Portal API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind portal listener");
    axum::serve(listener, app).await.expect("server error");
}

async fn health() -> &'static str {
    "OK"
}
