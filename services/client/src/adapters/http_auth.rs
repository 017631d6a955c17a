//! services/client/src/adapters/http_auth.rs
//!
//! This module contains the adapter for the remote authentication API.
//! It implements the `AuthService` port from the `core` crate over the
//! backend's REST endpoints.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use standards_desk_core::domain::{AuthGrant, Credentials, Registration, TokenPair, User};
use standards_desk_core::ports::{AuthService, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `AuthService` port against the REST API.
#[derive(Clone)]
pub struct HttpAuthAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthAdapter {
    /// Creates a new `HttpAuthAdapter`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/auth/{path}", self.base_url)
    }

    /// Sends a prepared request and decodes the JSON response body.
    ///
    /// Every request carries an `X-Request-Id` for server-side correlation.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let response = request
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

// The backend speaks the SimpleJWT field names (`access` / `refresh`); these
// records keep that vocabulary at the wire and convert to domain types.

#[derive(Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
        }
    }
}

#[derive(Deserialize)]
struct GrantRecord {
    access: String,
    refresh: String,
    user: UserRecord,
}
impl GrantRecord {
    fn to_domain(self) -> AuthGrant {
        AuthGrant {
            access_token: self.access,
            refresh_token: self.refresh,
            user: self.user.to_domain(),
        }
    }
}

#[derive(Deserialize)]
struct RefreshRecord {
    access: String,
    refresh: Option<String>,
}
impl RefreshRecord {
    fn to_domain(self) -> TokenPair {
        TokenPair {
            access_token: self.access,
            refresh_token: self.refresh,
        }
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// The error shape the backend produces for rejected requests.
#[derive(Deserialize, Default)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

/// Maps a non-success response to a `PortError`, extracting the
/// human-readable message when the backend supplied one.
async fn error_from_response(response: reqwest::Response) -> PortError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(%status, "auth request rejected");

    if status.is_client_error() {
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        if let Some(message) = parsed.detail.or(parsed.message) {
            return PortError::Rejected(message);
        }
        if status == StatusCode::UNAUTHORIZED {
            return PortError::Unauthorized;
        }
    }
    PortError::Unexpected(format!("unexpected status {status}"))
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for HttpAuthAdapter {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthGrant> {
        let record: GrantRecord = self
            .execute(self.http.post(self.endpoint("login/")).json(credentials))
            .await?;
        Ok(record.to_domain())
    }

    async fn register(&self, registration: &Registration) -> PortResult<AuthGrant> {
        let record: GrantRecord = self
            .execute(self.http.post(self.endpoint("register/")).json(registration))
            .await?;
        Ok(record.to_domain())
    }

    async fn logout(&self, access_token: &str) -> PortResult<()> {
        let response = self
            .http
            .post(self.endpoint("logout/"))
            .bearer_auth(access_token)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> PortResult<User> {
        let record: UserRecord = self
            .execute(self.http.get(self.endpoint("me/")).bearer_auth(access_token))
            .await?;
        Ok(record.to_domain())
    }

    async fn refresh(&self, refresh_token: &str) -> PortResult<TokenPair> {
        let record: RefreshRecord = self
            .execute(
                self.http
                    .post(self.endpoint("refresh/"))
                    .json(&RefreshRequest {
                        refresh: refresh_token,
                    }),
            )
            .await?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> HttpAuthAdapter {
        HttpAuthAdapter::new(reqwest::Client::new(), server.uri())
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn login_decodes_grant_from_wire_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login/"))
            .and(header_exists("X-Request-Id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "A",
                "refresh": "R",
                "user": {"id": "1", "email": "user@example.com", "name": "U"}
            })))
            .mount(&server)
            .await;

        let grant = adapter(&server).login(&credentials()).await.unwrap();

        assert_eq!(grant.access_token, "A");
        assert_eq!(grant.refresh_token, "R");
        assert_eq!(grant.user.id, "1");
        assert_eq!(grant.user.name, "U");
    }

    #[tokio::test]
    async fn rejection_with_detail_becomes_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": "No active account found with the given credentials"
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).login(&credentials()).await.unwrap_err();

        match err {
            PortError::Rejected(message) => {
                assert_eq!(message, "No active account found with the given credentials");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bare_unauthorized_becomes_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = adapter(&server).current_user("dead-token").await.unwrap_err();

        assert!(matches!(err, PortError::Unauthorized));
    }

    #[tokio::test]
    async fn server_error_becomes_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = adapter(&server).login(&credentials()).await.unwrap_err();

        assert!(matches!(err, PortError::Unexpected(_)));
    }

    #[tokio::test]
    async fn current_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me/"))
            .and(header("Authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1", "email": "user@example.com", "name": "U"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = adapter(&server).current_user("A1").await.unwrap();

        assert_eq!(user.email, "user@example.com");
    }

    #[tokio::test]
    async fn refresh_without_rotation_leaves_refresh_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh/"))
            .and(body_json(json!({"refresh": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
            .mount(&server)
            .await;

        let pair = adapter(&server).refresh("R1").await.unwrap();

        assert_eq!(pair.access_token, "A2");
        assert_eq!(pair.refresh_token, None);
    }

    #[tokio::test]
    async fn logout_succeeds_on_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/logout/"))
            .and(header("Authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        adapter(&server).logout("A1").await.unwrap();
    }
}
