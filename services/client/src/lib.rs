pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;

pub use adapters::{FileSnapshotStore, HttpAuthAdapter};
pub use config::Config;
pub use error::ClientError;
