//! JWT Authentication
//!
//! The portal resolves the caller once per request and injects a
//! `Principal` into core operations; core code never reads ambient state.

use axum::http::{header, HeaderMap, StatusCode};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use care_common::{EntityId, Principal, Role};

const SECRET: &[u8] = b"opencare-portal-secret-key-change-in-production";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user uid
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: String,
    pub exp: usize,
}

pub fn create_token(
    uid: &str,
    email: &str,
    name: Option<&str>,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(8))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: uid.to_string(),
        email: email.to_string(),
        name: name.map(str::to_string),
        role: role.as_str().to_string(),
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
}

pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(SECRET),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Resolve the bearer token into a `Principal`; 401 when absent/invalid.
pub fn authenticate(headers: &HeaderMap) -> Result<Principal, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let claims = verify_token(token).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(Principal::new(
        EntityId::from_string(claims.sub),
        claims.email,
        claims.name,
        Role::from_claim(&claims.role),
    ))
}

/// Authenticate and require the admin role; 403 for everyone else.
pub fn require_admin(headers: &HeaderMap) -> Result<Principal, StatusCode> {
    let principal = authenticate(headers)?;
    if !principal.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(principal)
}
