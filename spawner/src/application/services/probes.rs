//! Application service: read-only sandbox probes.
//!
//! Probes take no identity lock; they read the stored handles and ask the
//! platform directly.

use crate::application::ports::{
    AccountStore, IdentityApi, ResourceKind, TokenSource, WorkloadPlatform,
};
use crate::application::services::provisioning::{Orchestrator, checked};
use crate::domain::status::{self, ServiceAddress};
use crate::domain::{AccountRecord, ProvisionError};

impl<I, P, S, T> Orchestrator<I, P, S, T>
where
    I: IdentityApi,
    P: WorkloadPlatform,
    S: AccountStore,
    T: TokenSource,
{
    /// Whether the sandbox pod of `identity` reports `Ready=True`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown identity, `Upstream` when the platform query
    /// fails, `Parse` when the pod status has an unexpected shape.
    pub async fn pod_ready(&self, identity: &str) -> Result<bool, ProvisionError> {
        let record = self.active_record(identity).await?;
        let output = checked(
            self.platform.describe(ResourceKind::Pod, &record.pod_handle).await,
            "kubectl get pod failed",
        )?;
        Ok(status::pod_ready(&output.stdout)?)
    }

    /// `host:port` at which the sandbox of `identity` is reachable.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown identity, `Upstream` when a platform query
    /// fails, `Parse` when the service (or pod) status has an unexpected shape.
    pub async fn service_endpoint(&self, identity: &str) -> Result<String, ProvisionError> {
        let record = self.active_record(identity).await?;
        let output = checked(
            self.platform
                .describe(ResourceKind::Service, &record.service_name)
                .await,
            "kubectl get service failed",
        )?;
        match status::service_address(&output.stdout)? {
            ServiceAddress::LoadBalancer { host, port } => Ok(format!("{host}:{port}")),
            ServiceAddress::NodePort { node_port } => {
                let pod = checked(
                    self.platform.describe(ResourceKind::Pod, &record.pod_handle).await,
                    "kubectl get pod failed",
                )?;
                let host = status::pod_host_ip(&pod.stdout)?;
                Ok(format!("{host}:{node_port}"))
            }
        }
    }

    async fn active_record(&self, identity: &str) -> Result<AccountRecord, ProvisionError> {
        self.store
            .find(identity)
            .await?
            .ok_or(ProvisionError::NotFound)
    }
}
