pub mod domain;
pub mod ports;
pub mod session;

pub use domain::{AuthGrant, Credentials, Registration, SessionSnapshot, TokenPair, User};
pub use ports::{AuthService, PortError, PortResult, SnapshotStore};
pub use session::SessionManager;
