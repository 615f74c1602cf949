//! Authenticated caller identity
//!
//! Core operations never read ambient session state. The routing layer
//! resolves the caller once per request and injects a `Principal` into
//! every protected operation.

use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Role claim attached to an authenticated session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Caseworker,
}

impl Role {
    /// Parse a role claim string; unknown values default to caseworker.
    pub fn from_claim(claim: &str) -> Self {
        match claim {
            "admin" => Role::Admin,
            _ => Role::Caseworker,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Caseworker => "caseworker",
        }
    }
}

/// Authenticated identity plus role, passed explicitly into core operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: EntityId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn new(
        uid: EntityId,
        email: impl Into<String>,
        display_name: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            uid,
            email: email.into(),
            display_name,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name falling back to the email address
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
