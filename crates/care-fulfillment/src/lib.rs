//! OpenCare Fulfillment Platform
//!
//! Inventory pool, caseworker requests and the validate-then-commit
//! workflow that turns a pending request into an approved one.
//!
//! ## Features
//! - Inventory CRUD with lifetime delivery tallies
//! - Request submission with stock-aware validation
//! - All-or-nothing approval validation before any write
//! - Printable delivery receipts
//! - CSV bulk import
//! - Dashboard statistics

use thiserror::Error;

pub mod import;
pub mod inventory;
pub mod persistence;
pub mod ports;
pub mod receipt;
pub mod request;
pub mod stats;
pub mod workflow;

pub use import::{import_inventory_csv, parse_inventory_csv, ImportOutcome};
pub use inventory::{filter_items, InventoryItem, CATEGORY_OPTIONS, LOW_STOCK_THRESHOLD};
pub use persistence::{InMemoryInventoryRepository, InMemoryRequestRepository};
pub use ports::{InventoryRepository, RequestRepository};
pub use receipt::{generate_receipt, generate_receipt_at, Receipt, ReceiptLine};
pub use request::{Caseworker, Family, Request, RequestItem, RequestStatus};
pub use stats::{compute_stats, DashboardStats, RecentRequest, RequestTrends};
pub use workflow::{DeliveryLine, FulfillmentService};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("request not found: {0}")]
    RequestNotFound(String),

    #[error("inventory item not found: {0}")]
    ItemNotFound(String),

    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("invalid quantity for {name}: requested {requested}, available {available}")]
    InvalidQuantity {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("request already {0}")]
    AlreadyResolved(request::RequestStatus),

    #[error("request has no items")]
    EmptyRequest,

    #[error("operation requires administrator role")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(#[from] care_common::RepositoryError),

    /// Some writes committed before the failure; the affected records need
    /// manual reconciliation by an administrator.
    #[error("partial write: {completed} of {total} updates committed ({detail})")]
    PartialWrite {
        completed: usize,
        total: usize,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, FulfillmentError>;
