//! Sandbox spawner - per-user terminal sandboxes on Kubernetes

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sandbox_spawner::application::Orchestrator;
use sandbox_spawner::cli::Cli;
use sandbox_spawner::infra::command_runner::TokioCommandRunner;
use sandbox_spawner::infra::identity_api::HttpIdentityApi;
use sandbox_spawner::infra::kubectl::KubectlPlatform;
use sandbox_spawner::infra::store::FileAccountStore;
use sandbox_spawner::infra::token::UuidTokenGenerator;
use sandbox_spawner::server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Both ring and aws-lc-rs can end up linked; pick one explicitly.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    tracing::info!(
        port = cli.port,
        identity_endpoint = %cli.identity_endpoint,
        data_path = %cli.data_path.display(),
        namespace = cli.namespace.as_deref().unwrap_or("<default>"),
        tls_enabled = cli.tls().is_some(),
        "sandbox-spawner starting"
    );

    let store = FileAccountStore::open(&cli.data_path);
    let identity_api = HttpIdentityApi::new(
        &cli.identity_endpoint,
        cli.identity_admin_token.clone(),
        cli.http_timeout(),
    )
    .context("failed to initialise identity API client")?;
    let platform = KubectlPlatform::new(
        TokioCommandRunner::new(cli.kubectl_timeout()),
        cli.namespace.clone(),
    );
    let orchestrator = Orchestrator::new(
        identity_api,
        platform,
        store,
        UuidTokenGenerator,
        cli.provision_settings(),
    );

    let router = server::router(Arc::new(orchestrator));
    server::serve(cli.listen_addr(), cli.tls(), router).await?;

    tracing::info!("sandbox-spawner shut down");
    Ok(())
}
