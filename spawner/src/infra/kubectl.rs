//! Infrastructure implementation of the `WorkloadPlatform` port.
//!
//! `KubectlPlatform<R>` routes every Kubernetes operation through `kubectl`
//! via a `CommandRunner`. Manifests are piped on stdin.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ResourceKind, WorkloadPlatform};

const KUBECTL: &str = "kubectl";

/// Kubernetes adapter over the `kubectl` CLI.
///
/// Generic over `R: CommandRunner` so that tests can inject a recording
/// runner without spawning real processes.
pub struct KubectlPlatform<R: CommandRunner> {
    runner: R,
    namespace: Option<String>,
}

impl<R: CommandRunner> KubectlPlatform<R> {
    /// Create a platform adapter; `namespace` scopes every call when set.
    pub fn new(runner: R, namespace: Option<String>) -> Self {
        Self { runner, namespace }
    }

    /// Prefix `args` with the namespace flag when one is configured.
    fn scoped<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(ns) = &self.namespace {
            full.push("--namespace");
            full.push(ns.as_str());
        }
        full.extend_from_slice(args);
        full
    }
}

impl<R: CommandRunner> WorkloadPlatform for KubectlPlatform<R> {
    async fn apply(&self, manifest: &str) -> Result<Output> {
        let args = self.scoped(&["apply", "-f", "-"]);
        self.runner
            .run_with_stdin(KUBECTL, &args, manifest.as_bytes())
            .await
            .context("kubectl apply")
    }

    async fn pod_names(&self, selector: &str) -> Result<Output> {
        let args = self.scoped(&[
            "get",
            "pods",
            "-l",
            selector,
            "-o=jsonpath={.items[*].metadata.name}",
        ]);
        self.runner
            .run(KUBECTL, &args)
            .await
            .context("kubectl get pods")
    }

    async fn describe(&self, kind: ResourceKind, name: &str) -> Result<Output> {
        let args = self.scoped(&["get", kind.as_str(), name, "-o=json"]);
        self.runner
            .run(KUBECTL, &args)
            .await
            .with_context(|| format!("kubectl get {kind}"))
    }

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<Output> {
        let args = self.scoped(&["delete", kind.as_str(), name]);
        self.runner
            .run(KUBECTL, &args)
            .await
            .with_context(|| format!("kubectl delete {kind}"))
    }
}
