//! HTTP layer: axum router and listener setup.
//!
//! Imports from `crate::application` and `crate::domain` only; adapters are
//! chosen by the binary and arrive already wired into the orchestrator.

pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, put};
use axum_server::tls_rustls::RustlsConfig;
use spawner_common::paths;

use crate::application::{AccountStore, IdentityApi, Orchestrator, TokenSource, WorkloadPlatform};

pub use error::ApiError;

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub certificate: PathBuf,
    pub key: PathBuf,
}

/// Build the spawner API router around a shared orchestrator.
pub fn router<I, P, S, T>(orchestrator: Arc<Orchestrator<I, P, S, T>>) -> Router
where
    I: IdentityApi + 'static,
    P: WorkloadPlatform + 'static,
    S: AccountStore + 'static,
    T: TokenSource + 'static,
{
    Router::new()
        .route(
            paths::ACCOUNT,
            put(routes::create_account::<I, P, S, T>)
                .delete(routes::delete_account::<I, P, S, T>),
        )
        .route(paths::POD_READY, get(routes::pod_ready::<I, P, S, T>))
        .route(paths::SERVICE, get(routes::service_endpoint::<I, P, S, T>))
        .route(paths::HEALTH, get(routes::health))
        .with_state(orchestrator)
}

/// Serve `router` on `addr` until Ctrl-C, over HTTPS when `tls` is set.
///
/// # Errors
///
/// Returns an error if the certificate cannot be loaded, the address cannot
/// be bound, or the server fails.
pub async fn serve(addr: SocketAddr, tls: Option<TlsFiles>, router: Router) -> Result<()> {
    if let Some(tls) = tls {
        let config = RustlsConfig::from_pem_file(&tls.certificate, &tls.key)
            .await
            .with_context(|| {
                format!(
                    "failed to load TLS certificate {} and key {}",
                    tls.certificate.display(),
                    tls.key.display()
                )
            })?;
        tracing::info!(%addr, "listening (https)");

        let server = axum_server::bind_rustls(addr, config).serve(router.into_make_service());
        tokio::select! {
            result = server => result.context("HTTPS server error")?,
            () = shutdown_signal() => {}
        }
    } else {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(%addr, "listening (http)");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;
    }
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "unable to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
