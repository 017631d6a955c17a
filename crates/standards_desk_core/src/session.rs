//! crates/standards_desk_core/src/session.rs
//!
//! The session manager: single source of truth for authentication state.
//! It mediates between caller intents (login, register, logout, rehydration)
//! and the `AuthService` port, and keeps the durable snapshot in step with
//! the in-memory state after every committed mutation.
//!
//! Concurrency contract: state sits behind an `RwLock` that is only ever
//! held across synchronous commits, never across an `.await`. Overlapping
//! actions (e.g. a double-triggered login) therefore resolve last-write-wins:
//! whichever call completes last determines the final user and tokens, and
//! each call toggles `is_loading` independently, so a fast completion can
//! clear the flag while another call is still in flight. That race is part
//! of the contract, not an accident, and is pinned by a test below.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::domain::{Credentials, Registration, SessionSnapshot, User};
use crate::ports::{AuthService, PortError, PortResult, SnapshotStore};

/// Shown when a login failure carries no user-displayable message.
const LOGIN_FAILED: &str = "Login failed";

/// Shown when a registration failure carries no user-displayable message.
const REGISTRATION_FAILED: &str = "Registration failed";

//=========================================================================================
// Session State
//=========================================================================================

/// The full in-memory session state. The durable subset is `snapshot()`;
/// `is_loading` and `error` are transient.
#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
}

impl SessionState {
    fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            user: snapshot.user,
            access_token: snapshot.access_token,
            refresh_token: snapshot.refresh_token,
            is_authenticated: snapshot.is_authenticated,
            is_loading: false,
            error: None,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    /// Full teardown: identity and both tokens gone. Transient fields are
    /// left alone; `logout` resets those separately.
    fn tear_down(&mut self) {
        self.user = None;
        self.access_token = None;
        self.refresh_token = None;
        self.is_authenticated = false;
    }
}

//=========================================================================================
// Session Manager
//=========================================================================================

/// Owns the session state for one running application.
///
/// Clones share the same state, so the application constructs one manager
/// and hands clones to whichever layer needs it; there is no global lookup.
#[derive(Clone)]
pub struct SessionManager {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn SnapshotStore>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionManager {
    /// Creates the manager and rehydrates the persisted snapshot before
    /// anything can read the state. Empty or unreadable storage falls back
    /// to the all-empty initial state; construction never fails.
    pub fn new(auth: Arc<dyn AuthService>, store: Arc<dyn SnapshotStore>) -> Self {
        let initial = match store.load() {
            Ok(Some(snapshot)) => SessionState::from_snapshot(snapshot),
            Ok(None) => SessionState::default(),
            Err(err) => {
                warn!("failed to load session snapshot, starting empty: {err}");
                SessionState::default()
            }
        };
        Self {
            auth,
            store,
            state: Arc::new(RwLock::new(initial)),
        }
    }

    // --- Actions -----------------------------------------------------------------------

    /// Signs in with email and password.
    ///
    /// On success the identity and both tokens are committed atomically and
    /// persisted. On failure the credential fields are untouched, `error`
    /// holds a displayable message, and the failure is returned so the
    /// caller can react (e.g. keep a form open).
    pub async fn login(&self, email: &str, password: &str) -> PortResult<()> {
        self.commit_transient(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.auth.login(&credentials).await {
            Ok(grant) => {
                debug!(email, "login succeeded");
                self.commit(|state| {
                    state.user = Some(grant.user);
                    state.access_token = Some(grant.access_token);
                    state.refresh_token = Some(grant.refresh_token);
                    state.is_authenticated = true;
                    state.is_loading = false;
                });
                Ok(())
            }
            Err(err) => {
                let message = err.display_message(LOGIN_FAILED);
                self.commit_transient(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Creates an account and signs the new user in. Same contract as
    /// [`login`](Self::login), with "Registration failed" as the default
    /// message.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> PortResult<()> {
        self.commit_transient(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let registration = Registration {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };

        match self.auth.register(&registration).await {
            Ok(grant) => {
                debug!(email, "registration succeeded");
                self.commit(|state| {
                    state.user = Some(grant.user);
                    state.access_token = Some(grant.access_token);
                    state.refresh_token = Some(grant.refresh_token);
                    state.is_authenticated = true;
                    state.is_loading = false;
                });
                Ok(())
            }
            Err(err) => {
                let message = err.display_message(REGISTRATION_FAILED);
                self.commit_transient(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Ends the session. The remote call's outcome is ignored: a user must
    /// always be able to leave a stuck or unreachable session, so local
    /// state reaches its terminal value unconditionally.
    pub async fn logout(&self) {
        if let Some(token) = self.held_access_token() {
            if let Err(err) = self.auth.logout(&token).await {
                debug!("remote logout failed, clearing local session anyway: {err}");
            }
        }
        self.commit(|state| *state = SessionState::default());
    }

    /// Overwrites the identity record. No other field changes. Used when a
    /// fresher record is fetched outside the login flow.
    pub fn set_user(&self, user: User) {
        self.commit(|state| state.user = Some(user));
    }

    /// Sets the access token, keeps the existing refresh token unless a new
    /// one is supplied, and recomputes `is_authenticated` from the access
    /// token alone.
    ///
    /// This can leave `is_authenticated = true` with no loaded user, an
    /// accepted transient; callers follow up with [`set_user`](Self::set_user)
    /// or [`check_auth`](Self::check_auth).
    pub fn set_tokens(&self, access_token: String, refresh_token: Option<String>) {
        self.commit(|state| {
            state.is_authenticated = !access_token.is_empty();
            state.access_token = Some(access_token);
            if let Some(refresh) = refresh_token {
                state.refresh_token = Some(refresh);
            }
        });
    }

    /// Clears the recorded error message. No other effect.
    pub fn clear_error(&self) {
        self.commit_transient(|state| state.error = None);
    }

    /// Rehydration and token validation.
    ///
    /// With no access token held there is nothing to validate: the
    /// authenticated flag is lowered and every other field is left alone.
    /// With a token held, the identity is fetched; a rejection means the
    /// token is dead and the whole session is torn down. Failures are not
    /// re-signaled: this runs at bootstrap, outside user interaction.
    pub async fn check_auth(&self) {
        let Some(token) = self.held_access_token() else {
            self.commit(|state| state.is_authenticated = false);
            return;
        };

        match self.auth.current_user(&token).await {
            Ok(user) => {
                self.commit(|state| {
                    state.user = Some(user);
                    state.is_authenticated = true;
                });
            }
            Err(err) => {
                debug!("stored access token rejected, tearing session down: {err}");
                self.commit(|state| state.tear_down());
            }
        }
    }

    /// Exchanges the held refresh token for a fresh access token.
    ///
    /// A missing refresh token is `Unauthorized` with no state change. A
    /// rejected refresh token ends the session the same way an invalid
    /// access token does in [`check_auth`](Self::check_auth).
    pub async fn refresh_session(&self) -> PortResult<()> {
        let refresh = {
            let state = self.read();
            state.refresh_token.clone().filter(|t| !t.is_empty())
        };
        let Some(refresh) = refresh else {
            return Err(PortError::Unauthorized);
        };

        match self.auth.refresh(&refresh).await {
            Ok(pair) => {
                self.commit(|state| {
                    state.is_authenticated = !pair.access_token.is_empty();
                    state.access_token = Some(pair.access_token);
                    if let Some(rotated) = pair.refresh_token {
                        state.refresh_token = Some(rotated);
                    }
                });
                Ok(())
            }
            Err(err) => {
                debug!("token refresh rejected, tearing session down: {err}");
                self.commit(|state| state.tear_down());
                Err(err)
            }
        }
    }

    // --- Read accessors ----------------------------------------------------------------

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// The durable subset as it would be persisted right now.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().snapshot()
    }

    // --- Internals ---------------------------------------------------------------------

    /// The held access token, with JS-style truthiness: an empty string
    /// counts as absent.
    fn held_access_token(&self) -> Option<String> {
        self.read().access_token.clone().filter(|t| !t.is_empty())
    }

    /// Mutates the state and immediately writes the durable snapshot, with
    /// no suspension point between commit and write.
    fn commit(&self, mutate: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = self.write();
            mutate(&mut state);
            state.snapshot()
        };
        if let Err(err) = self.store.save(&snapshot) {
            // In-memory state is authoritative; a storage hiccup must not
            // fail the action that just succeeded.
            warn!("failed to persist session snapshot: {err}");
        }
    }

    /// Mutates transient fields only (`is_loading`, `error`); the durable
    /// snapshot is unaffected, so nothing is written.
    fn commit_transient(&self, mutate: impl FnOnce(&mut SessionState)) {
        let mut state = self.write();
        mutate(&mut state);
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

//=========================================================================================
// Tests
//=========================================================================================
