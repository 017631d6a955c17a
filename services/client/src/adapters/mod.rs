pub mod http_auth;
pub mod snapshot_file;

pub use http_auth::HttpAuthAdapter;
pub use snapshot_file::FileSnapshotStore;
