//! Request handlers. Each one unwraps the identity path segment and delegates
//! to the shared orchestrator.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use spawner_common::{AccountCreated, PodReadiness, ServiceEndpoint};

use crate::application::{AccountStore, IdentityApi, Orchestrator, TokenSource, WorkloadPlatform};
use crate::server::error::ApiError;

type Shared<I, P, S, T> = State<Arc<Orchestrator<I, P, S, T>>>;

pub async fn create_account<I, P, S, T>(
    State(orchestrator): Shared<I, P, S, T>,
    Path(identity): Path<String>,
) -> Result<Json<AccountCreated>, ApiError>
where
    I: IdentityApi,
    P: WorkloadPlatform,
    S: AccountStore,
    T: TokenSource,
{
    let auth = orchestrator.create(&identity).await?;
    Ok(Json(AccountCreated { auth }))
}

pub async fn delete_account<I, P, S, T>(
    State(orchestrator): Shared<I, P, S, T>,
    Path(identity): Path<String>,
) -> Result<StatusCode, ApiError>
where
    I: IdentityApi,
    P: WorkloadPlatform,
    S: AccountStore,
    T: TokenSource,
{
    orchestrator.delete(&identity).await?;
    Ok(StatusCode::OK)
}

pub async fn pod_ready<I, P, S, T>(
    State(orchestrator): Shared<I, P, S, T>,
    Path(identity): Path<String>,
) -> Result<Json<PodReadiness>, ApiError>
where
    I: IdentityApi,
    P: WorkloadPlatform,
    S: AccountStore,
    T: TokenSource,
{
    let ready = orchestrator.pod_ready(&identity).await?;
    Ok(Json(PodReadiness { ready }))
}

pub async fn service_endpoint<I, P, S, T>(
    State(orchestrator): Shared<I, P, S, T>,
    Path(identity): Path<String>,
) -> Result<Json<ServiceEndpoint>, ApiError>
where
    I: IdentityApi,
    P: WorkloadPlatform,
    S: AccountStore,
    T: TokenSource,
{
    let endpoint = orchestrator.service_endpoint(&identity).await?;
    Ok(Json(ServiceEndpoint { endpoint }))
}

/// Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
