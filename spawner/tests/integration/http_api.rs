//! End-to-end HTTP tests: the real router on an ephemeral port, driven with
//! reqwest, over fake identity API and platform adapters.

use std::sync::Arc;

use reqwest::StatusCode;
use sandbox_spawner::application::AccountStore;
use sandbox_spawner::server;
use spawner_common::{
    AccountCreated, ErrorBody, PodReadiness, ServiceEndpoint, account_path, pod_ready_path,
    service_path,
};
use tempfile::TempDir;

use crate::helpers::{
    FakeIdentityApi, PlatformOp, RecordingPlatform, TestOrchestrator, orchestrator,
};

struct TestServer {
    base: String,
    client: reqwest::Client,
    orchestrator: Arc<TestOrchestrator>,
    _dir: TempDir,
}

impl TestServer {
    async fn start(identity_api: FakeIdentityApi, platform: RecordingPlatform) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let orchestrator = Arc::new(orchestrator(&dir, identity_api, platform));
        let app = server::router(Arc::clone(&orchestrator));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            orchestrator,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn put(&self, path: &str) -> reqwest::Response {
        self.client.put(self.url(path)).send().await.expect("PUT")
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET")
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.expect("DELETE")
    }
}

#[tokio::test]
async fn put_account_returns_token_and_is_idempotent() {
    let identity = FakeIdentityApi::new();
    let srv = TestServer::start(identity.clone(), RecordingPlatform::new()).await;

    let first = srv.put(&account_path("alice")).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first: AccountCreated = first.json().await.expect("json");
    assert_eq!(first.auth, "slate:token-0");

    let second: AccountCreated = srv
        .put(&account_path("alice"))
        .await
        .json()
        .await
        .expect("json");
    assert_eq!(second, first);
    assert_eq!(identity.creates(), 1);
}

#[tokio::test]
async fn unknown_identity_is_404_on_every_identity_route() {
    let srv = TestServer::start(FakeIdentityApi::new(), RecordingPlatform::new()).await;

    for response in [
        srv.delete(&account_path("nobody")).await,
        srv.get(&pod_ready_path("nobody")).await,
        srv.get(&service_path("nobody")).await,
    ] {
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = response.json().await.expect("json");
        assert_eq!(body.error, "User not found");
    }
}

#[tokio::test]
async fn delete_returns_200_with_empty_body() {
    let srv = TestServer::start(FakeIdentityApi::new(), RecordingPlatform::new()).await;
    srv.put(&account_path("alice")).await;

    let response = srv.delete(&account_path("alice")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.expect("body").is_empty());
    assert!(
        srv.orchestrator
            .store()
            .find("alice")
            .await
            .expect("find")
            .is_none()
    );
}

#[tokio::test]
async fn probes_report_readiness_and_endpoint() {
    let srv = TestServer::start(FakeIdentityApi::new(), RecordingPlatform::new()).await;
    srv.put(&account_path("alice")).await;

    let ready: PodReadiness = srv
        .get(&pod_ready_path("alice"))
        .await
        .json()
        .await
        .expect("json");
    assert!(ready.ready);

    let endpoint: ServiceEndpoint = srv
        .get(&service_path("alice"))
        .await
        .json()
        .await
        .expect("json");
    assert_eq!(endpoint.endpoint, "192.0.2.10:5000");
}

#[tokio::test]
async fn provisioning_failure_is_500_with_message() {
    let srv = TestServer::start(
        FakeIdentityApi::new(),
        RecordingPlatform::failing(PlatformOp::Apply),
    )
    .await;

    let response = srv.put(&account_path("alice")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = response.json().await.expect("json");
    assert_eq!(body.error, "Unable to deploy kubernetes pod: boom");
}

#[tokio::test]
async fn identity_api_failure_is_500() {
    let srv = TestServer::start(FakeIdentityApi::failing_create(), RecordingPlatform::new()).await;

    let response = srv.put(&account_path("alice")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = response.json().await.expect("json");
    assert!(
        body.error.starts_with("Failed to create identity account"),
        "{}",
        body.error
    );
}

#[tokio::test]
async fn percent_encoded_identity_is_decoded() {
    let srv = TestServer::start(FakeIdentityApi::new(), RecordingPlatform::new()).await;

    let response = srv.put("/account/alice%40example.org").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        srv.orchestrator
            .store()
            .find("alice@example.org")
            .await
            .expect("find")
            .is_some()
    );
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::start(FakeIdentityApi::new(), RecordingPlatform::new()).await;
    let response = srv.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let srv = TestServer::start(FakeIdentityApi::new(), RecordingPlatform::new()).await;
    let response = srv.get(&account_path("alice")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
