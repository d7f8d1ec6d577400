use serde::{Deserialize, Serialize};

/// Body returned by `PUT /account/{identity}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCreated {
    /// Credential the user presents to their sandbox terminal.
    pub auth: String,
}

/// Body returned by `GET /pod_ready/{identity}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodReadiness {
    pub ready: bool,
}

/// Body returned by `GET /service/{identity}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// `host:port` the sandbox is reachable at.
    pub endpoint: String,
}

/// Body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
