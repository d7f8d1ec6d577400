//! Command-line and environment configuration with clap derive.
//!
//! Every flag can also be supplied through its `SPAWNER_*` environment
//! variable; an explicit flag wins.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use spawner_common::{DEFAULT_DATA_PATH, DEFAULT_IDENTITY_ENDPOINT, DEFAULT_LISTEN_PORT};

use crate::application::ProvisionSettings;
use crate::domain::{ServiceExposure, WorkloadSettings};
use crate::server::TlsFiles;

/// Provision per-user terminal sandboxes on Kubernetes
#[derive(Debug, Parser)]
#[command(name = "sandbox-spawner", version)]
pub struct Cli {
    /// Port to listen on
    #[arg(
        long,
        env = "SPAWNER_PORT",
        default_value_t = DEFAULT_LISTEN_PORT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: u16,

    /// PEM certificate chain; enables HTTPS together with --ssl-key
    #[arg(long, env = "SPAWNER_SSL_CERTIFICATE", requires = "ssl_key")]
    pub ssl_certificate: Option<PathBuf>,

    /// PEM private key for --ssl-certificate
    #[arg(long, env = "SPAWNER_SSL_KEY", requires = "ssl_certificate")]
    pub ssl_key: Option<PathBuf>,

    /// Base URL of the identity API
    #[arg(long, env = "SPAWNER_IDENTITY_ENDPOINT", default_value = DEFAULT_IDENTITY_ENDPOINT)]
    pub identity_endpoint: String,

    /// Admin token for the identity API
    #[arg(long, env = "SPAWNER_IDENTITY_ADMIN_TOKEN", hide_env_values = true)]
    pub identity_admin_token: String,

    /// File holding the account records
    #[arg(long, env = "SPAWNER_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Kubernetes namespace for every sandbox object (kubectl default if unset)
    #[arg(long, env = "SPAWNER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Container image of the sandbox terminal
    #[arg(long, env = "SPAWNER_WORKLOAD_IMAGE", default_value = "slateci/container-ttyd")]
    pub workload_image: String,

    /// Mount path of the identity credentials inside the sandbox
    #[arg(long, env = "SPAWNER_CREDENTIALS_MOUNT", default_value = "/home/slate/.slate")]
    pub credentials_mount: String,

    /// How sandbox services are exposed outside the cluster
    #[arg(
        long,
        env = "SPAWNER_SERVICE_TYPE",
        value_enum,
        default_value_t = ServiceType::LoadBalancer
    )]
    pub service_type: ServiceType,

    /// Upper bound on a single kubectl invocation, in seconds
    #[arg(long, env = "SPAWNER_KUBECTL_TIMEOUT_SECS", default_value_t = 120)]
    pub kubectl_timeout_secs: u64,

    /// Upper bound on a single identity API request, in seconds
    #[arg(long, env = "SPAWNER_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceType {
    /// Cloud load balancer; endpoint is its ingress address
    LoadBalancer,
    /// Node port; endpoint is the address of the node running the pod
    NodePort,
}

impl From<ServiceType> for ServiceExposure {
    fn from(value: ServiceType) -> Self {
        match value {
            ServiceType::LoadBalancer => Self::LoadBalancer,
            ServiceType::NodePort => Self::NodePort,
        }
    }
}

impl Cli {
    /// Address the HTTP server binds to (all interfaces).
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// TLS files when both halves are configured.
    #[must_use]
    pub fn tls(&self) -> Option<TlsFiles> {
        match (&self.ssl_certificate, &self.ssl_key) {
            (Some(certificate), Some(key)) => Some(TlsFiles {
                certificate: certificate.clone(),
                key: key.clone(),
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn provision_settings(&self) -> ProvisionSettings {
        ProvisionSettings {
            workload: WorkloadSettings {
                image: self.workload_image.clone(),
                credentials_mount: self.credentials_mount.clone(),
                exposure: self.service_type.into(),
            },
            credential_user: "slate".to_string(),
        }
    }

    #[must_use]
    pub fn kubectl_timeout(&self) -> Duration {
        Duration::from_secs(self.kubectl_timeout_secs)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
