pub mod config;
pub mod routes;
pub mod types;

pub use config::{DEFAULT_DATA_PATH, DEFAULT_IDENTITY_ENDPOINT, DEFAULT_LISTEN_PORT};
pub use routes::{account_path, paths, pod_ready_path, service_path};
pub use types::*;
