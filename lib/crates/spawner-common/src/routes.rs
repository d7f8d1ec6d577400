/// Route templates served by the spawner (axum path syntax).
pub mod paths {
    /// Create (PUT) or delete (DELETE) the account of `{identity}`.
    pub const ACCOUNT: &str = "/account/{identity}";

    /// Readiness of the sandbox pod of `{identity}`.
    pub const POD_READY: &str = "/pod_ready/{identity}";

    /// Externally reachable endpoint of the sandbox of `{identity}`.
    pub const SERVICE: &str = "/service/{identity}";

    /// Liveness probe.
    pub const HEALTH: &str = "/health";
}

/// Build the account path for `identity`.
#[must_use]
pub fn account_path(identity: &str) -> String {
    format!("/account/{identity}")
}

/// Build the pod readiness path for `identity`.
#[must_use]
pub fn pod_ready_path(identity: &str) -> String {
    format!("/pod_ready/{identity}")
}

/// Build the service endpoint path for `identity`.
#[must_use]
pub fn service_path(identity: &str) -> String {
    format!("/service/{identity}")
}
