//! Application service: account create/delete use-cases.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! All I/O is routed through injected port traits.
//!
//! A create touches three systems in order: the identity API, the platform,
//! then the store. Only the final store write makes the identity active, so a
//! failure part way through leaves no record behind. External objects created
//! before the failure are not rolled back.

use std::process::Output;

use chrono::Utc;

use crate::application::ports::{
    AccountStore, IdentityApi, ResourceKind, TokenSource, WorkloadPlatform,
};
use crate::application::services::identity_locks::IdentityLocks;
use crate::domain::manifest::{self, WorkloadParams, WorkloadSettings};
use crate::domain::{AccountRecord, ProvisionError, workload_names};

/// Settings applied to every provisioned account.
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub workload: WorkloadSettings,
    /// Login name placed in front of every auth token (`<user>:<token>`).
    pub credential_user: String,
}

/// Drives the account lifecycle across the identity API, the workload
/// platform, and the account store.
///
/// Shared by every request handler; per-identity operations are serialized
/// internally.
pub struct Orchestrator<I, P, S, T> {
    pub(super) identity_api: I,
    pub(super) platform: P,
    pub(super) store: S,
    tokens: T,
    settings: ProvisionSettings,
    locks: IdentityLocks,
}

impl<I, P, S, T> Orchestrator<I, P, S, T>
where
    I: IdentityApi,
    P: WorkloadPlatform,
    S: AccountStore,
    T: TokenSource,
{
    pub fn new(
        identity_api: I,
        platform: P,
        store: S,
        tokens: T,
        settings: ProvisionSettings,
    ) -> Self {
        Self {
            identity_api,
            platform,
            store,
            tokens,
            settings,
            locks: IdentityLocks::new(),
        }
    }

    /// The backing account store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Provision a sandbox for `identity` and return its auth token.
    ///
    /// Returns the existing token without any external call when the identity
    /// is already active.
    ///
    /// # Errors
    ///
    /// `PoolExhausted` when no service port is free, `Upstream` when the
    /// identity API or the platform fails, `Storage` when the record cannot
    /// be persisted.
    pub async fn create(&self, identity: &str) -> Result<String, ProvisionError> {
        let _guard = self.locks.acquire(identity).await;

        if let Some(existing) = self.store.find(identity).await? {
            tracing::debug!(identity, "account already exists");
            return Ok(existing.auth_token);
        }

        tracing::info!(identity, "creating account");
        let auth_token = format!("{}:{}", self.settings.credential_user, self.tokens.token());
        let port = self.store.allocate_port().await?;
        let reservation = PortReservation {
            store: &self.store,
            port,
            armed: true,
        };

        let result = self.provision(identity, auth_token, reservation).await;
        if let Err(err) = &result {
            tracing::error!(identity, port, error = %err, "account creation failed");
        }
        result
    }

    async fn provision(
        &self,
        identity: &str,
        auth_token: String,
        reservation: PortReservation<'_, S>,
    ) -> Result<String, ProvisionError> {
        let port = reservation.port;
        let account = self
            .identity_api
            .create_account(identity)
            .await
            .map_err(|e| {
                ProvisionError::upstream("Failed to create identity account", format!("{e:#}"))
            })?;
        tracing::info!(identity, account_id = %account.id, "identity account created");

        let names = workload_names(identity);
        let manifest = manifest::render(
            &self.settings.workload,
            &WorkloadParams {
                names: &names,
                auth_token: &auth_token,
                service_port: port,
                external_account_token: &account.access_token,
                identity_endpoint: self.identity_api.endpoint(),
            },
        )
        .map_err(|e| ProvisionError::upstream("Unable to render workload manifest", e))?;

        tracing::info!(identity, workload = %names.workload, port, "deploying workload");
        checked(
            self.platform.apply(&manifest).await,
            "Unable to deploy kubernetes pod",
        )?;

        let selector = names.selector();
        let lookup = checked(
            self.platform.pod_names(&selector).await,
            "Unable to look up kubernetes pod",
        )?;
        let pod_handle = first_pod(&lookup.stdout).ok_or_else(|| {
            ProvisionError::upstream(
                "Unable to look up kubernetes pod",
                format!("no pod matches {selector}"),
            )
        })?;

        let record = AccountRecord {
            identity: identity.to_owned(),
            workload_name: names.workload,
            pod_handle,
            service_name: names.service,
            secret_name: names.secret,
            service_port: port,
            auth_token: auth_token.clone(),
            external_account_id: account.id,
            external_account_token: account.access_token,
            created_at: Utc::now(),
        };
        reservation.hand_over();
        self.store.record(identity, record).await?;
        tracing::info!(identity, port, "account created");
        Ok(auth_token)
    }

    /// Tear down the sandbox and identity account of `identity`.
    ///
    /// The record is removed only after every external object is gone; the
    /// first failing step aborts the rest and leaves the record in place.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown identity, `Upstream` when a teardown step
    /// fails, `Storage` when the removal cannot be persisted.
    pub async fn delete(&self, identity: &str) -> Result<(), ProvisionError> {
        let _guard = self.locks.acquire(identity).await;

        let record = self
            .store
            .find(identity)
            .await?
            .ok_or(ProvisionError::NotFound)?;
        tracing::info!(identity, "deleting account");

        self.identity_api
            .delete_account(&record.external_account_id)
            .await
            .map_err(|e| {
                ProvisionError::upstream("Failed to delete identity account", format!("{e:#}"))
            })?;

        for (kind, name) in [
            (ResourceKind::Deployment, &record.workload_name),
            (ResourceKind::Service, &record.service_name),
            (ResourceKind::Secret, &record.secret_name),
        ] {
            checked(
                self.platform.delete(kind, name).await,
                &format!("kubectl delete {kind} failed"),
            )
            .inspect_err(|err| {
                tracing::error!(identity, %kind, %name, error = %err, "teardown step failed");
            })?;
        }

        self.store.remove(identity).await?;
        tracing::info!(identity, port = record.service_port, "account deleted");
        Ok(())
    }
}

/// Port reserved for an in-flight create.
///
/// Released on drop, which also covers a create future dropped at an await
/// point. `hand_over` disarms it right before `record`, which consumes the
/// reservation itself.
struct PortReservation<'a, S: AccountStore> {
    store: &'a S,
    port: u16,
    armed: bool,
}

impl<S: AccountStore> PortReservation<'_, S> {
    fn hand_over(mut self) {
        self.armed = false;
    }
}

impl<S: AccountStore> Drop for PortReservation<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(port = self.port, "releasing port reservation");
            self.store.release_port(self.port);
        }
    }
}

/// Turn a platform call result into its output, treating spawn failures and
/// non-zero exits alike as upstream failures.
pub(super) fn checked(
    result: anyhow::Result<Output>,
    message: &str,
) -> Result<Output, ProvisionError> {
    let output = result.map_err(|e| ProvisionError::upstream(message, format!("{e:#}")))?;
    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ProvisionError::upstream(message, stderr.trim()))
    }
}

/// First name in `kubectl ... -o=jsonpath={.items[*].metadata.name}` output.
///
/// Several matches can appear while a previous pod is terminating; the first
/// one is used.
fn first_pod(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    let mut names = text.split_whitespace();
    let first = names.next()?.to_owned();
    if names.next().is_some() {
        tracing::warn!(pod = %first, "several pods match the workload; using the first");
    }
    Some(first)
}
