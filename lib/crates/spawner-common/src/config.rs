//! Defaults shared by the spawner binary and anything that talks to it.

/// Port the spawner listens on when none is configured.
pub const DEFAULT_LISTEN_PORT: u16 = 18081;

/// Identity API base URL used when none is configured.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "http://localhost:18080";

/// Account data file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data";
