//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`
//! or `crate::server`.
//!
//! Async methods are declared as `-> impl Future + Send` so that services
//! generic over these ports can be driven from multi-threaded HTTP handlers.
//! Implementations may still use `async fn`.

use std::future::Future;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{AccountRecord, ExternalAccount, StoreError};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Platform object kinds the spawner creates, inspects, and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Deployment,
    Pod,
    Secret,
    Service,
}

impl ResourceKind {
    /// Name accepted by `kubectl get/delete`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::Pod => "pod",
            Self::Secret => "secret",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
pub trait CommandRunner: Send + Sync {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<Output>> + Send;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> impl Future<Output = Result<Output>> + Send;
    /// Run a program with stdin piped from `stdin`.
    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: &[u8],
    ) -> impl Future<Output = Result<Output>> + Send;
}

// ── Orchestration Platform Port ───────────────────────────────────────────────

/// Container-orchestration operations needed for one sandbox lifecycle.
///
/// Every method returns the raw process output; callers decide what a
/// non-zero exit status means.
pub trait WorkloadPlatform: Send + Sync {
    /// Create or update every object in a multi-document manifest.
    fn apply(&self, manifest: &str) -> impl Future<Output = Result<Output>> + Send;
    /// Names of the pods matching a label selector, whitespace separated.
    fn pod_names(&self, selector: &str) -> impl Future<Output = Result<Output>> + Send;
    /// Full JSON description of one object.
    fn describe(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> impl Future<Output = Result<Output>> + Send;
    /// Delete one object.
    fn delete(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> impl Future<Output = Result<Output>> + Send;
}

// ── Identity API Port ─────────────────────────────────────────────────────────

/// Account management on the external identity API.
pub trait IdentityApi: Send + Sync {
    /// Base URL handed to workloads so they can reach the identity API.
    fn endpoint(&self) -> &str;
    /// Create an account for `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// unparsable response.
    fn create_account(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<ExternalAccount>> + Send;
    /// Delete the account with the given identity-API id.
    fn delete_account(&self, account_id: &str) -> impl Future<Output = Result<()>> + Send;
}

// ── Account Store Port ────────────────────────────────────────────────────────

/// Durable identity → record map plus the service port pool.
///
/// Implementations serialize every operation; `record` and `remove` return
/// only after the change is on disk.
pub trait AccountStore: Send + Sync {
    /// Look up the record of `identity`.
    fn find(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<AccountRecord>, StoreError>> + Send;
    /// Insert or fully replace the record of `identity` and persist.
    ///
    /// Consumes any reservation of the record's port, whether the write
    /// succeeds or not, and even when the caller stops awaiting once the
    /// write has started.
    fn record(
        &self,
        identity: &str,
        record: AccountRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    /// Erase the record of `identity` (no-op if absent) and persist.
    fn remove(&self, identity: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
    /// Lowest free service port, reserved until recorded or released.
    fn allocate_port(&self) -> impl Future<Output = Result<u16, StoreError>> + Send;
    /// Drop the reservation of a port that was never recorded.
    ///
    /// Synchronous so it can run from `Drop`.
    fn release_port(&self, port: u16);
}

// ── Token Port ────────────────────────────────────────────────────────────────

/// Source of fresh, unguessable tokens.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> String;
}
