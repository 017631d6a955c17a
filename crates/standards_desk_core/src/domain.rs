//! crates/standards_desk_core/src/domain.rs
//!
//! Defines the pure, core data structures for the session client.
//! These structs are independent of any transport or storage backend; they
//! derive serde because the snapshot and the wire payloads are JSON.

use serde::{Deserialize, Serialize};

/// An authenticated user's identity record.
///
/// Immutable value type: the auth service produces it whole and the session
/// manager replaces it whole, never field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Login request payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// What a successful login or registration yields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// What a successful token refresh yields.
///
/// The refresh endpoint always returns a new access token but only rotates
/// the refresh token on some backends, hence the `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// The durable subset of the session state.
///
/// This is exactly what gets written to the storage slot: `is_loading` and
/// `error` are transient and never appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
}
