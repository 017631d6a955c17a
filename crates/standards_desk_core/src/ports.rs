//! crates/standards_desk_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the session client's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP transports or
//! on-disk storage.

use async_trait::async_trait;

use crate::domain::{AuthGrant, Credentials, Registration, SessionSnapshot, TokenPair, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, disk).
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    /// The remote service refused the request and supplied a human-readable
    /// message. This is the only variant whose text may be shown to users.
    #[error("{0}")]
    Rejected(String),
    /// The credential or token is no longer valid.
    #[error("Unauthorized")]
    Unauthorized,
    /// Transport failures, malformed responses, I/O. Never shown to users
    /// verbatim; actions substitute their documented default message.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The message suitable for direct display, or `fallback` when the
    /// failure carries nothing a user should see.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            PortError::Rejected(msg) if !msg.trim().is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote authentication capability the session manager consumes.
///
/// A test double can be substituted for the real HTTP implementation without
/// touching the session manager's logic.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges credentials for tokens and the user's identity record.
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthGrant>;

    /// Creates an account and signs the new user in, in one round trip.
    async fn register(&self, registration: &Registration) -> PortResult<AuthGrant>;

    /// Invalidates the session on the server side. Callers ignore the outcome.
    async fn logout(&self, access_token: &str) -> PortResult<()>;

    /// Fetches the identity record the access token belongs to.
    async fn current_user(&self, access_token: &str) -> PortResult<User>;

    /// Exchanges a refresh token for a new access token (and possibly a
    /// rotated refresh token).
    async fn refresh(&self, refresh_token: &str) -> PortResult<TokenPair>;
}

/// The durable storage slot for the persisted session subset.
///
/// Deliberately synchronous: the persistence write must happen immediately
/// after the in-memory commit, with no suspension point in between.
pub trait SnapshotStore: Send + Sync {
    /// Reads the stored snapshot. An empty or corrupt slot loads as
    /// `Ok(None)`; rehydration must never fail startup.
    fn load(&self) -> PortResult<Option<SessionSnapshot>>;

    /// Overwrites the slot with the given snapshot.
    fn save(&self, snapshot: &SessionSnapshot) -> PortResult<()>;
}
