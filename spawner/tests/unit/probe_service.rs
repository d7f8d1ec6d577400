//! Unit tests for the pod readiness and service endpoint probes.

use sandbox_spawner::domain::{ProvisionError, ServiceExposure};
use sandbox_spawner::infra::store::FileAccountStore;
use tempfile::TempDir;

use crate::helpers::{
    FakeIdentityApi, LOAD_BALANCER_SERVICE, PlatformOp, READY_POD, RecordingPlatform,
    TestOrchestrator, orchestrator, orchestrator_with,
};

async fn provisioned(dir: &TempDir, platform: RecordingPlatform) -> TestOrchestrator {
    let orch = orchestrator(dir, FakeIdentityApi::new(), platform);
    orch.create("alice").await.expect("create");
    orch
}

#[tokio::test]
async fn ready_pod_reports_ready() {
    let dir = TempDir::new().expect("tempdir");
    let platform = RecordingPlatform::new();
    let orch = provisioned(&dir, platform.clone()).await;

    assert!(orch.pod_ready("alice").await.expect("probe"));
    assert_eq!(
        platform.calls().last().map(String::as_str),
        Some("get pod ttyd-alice-5d9c7-abcde")
    );
}

#[tokio::test]
async fn pending_pod_is_not_ready() {
    let dir = TempDir::new().expect("tempdir");
    let pod = br#"{"status":{"conditions":[{"type":"Ready","status":"False"}]}}"#;
    let orch = provisioned(&dir, RecordingPlatform::with_status(pod, LOAD_BALANCER_SERVICE)).await;

    assert!(!orch.pod_ready("alice").await.expect("probe"));
}

#[tokio::test]
async fn malformed_pod_status_is_a_parse_failure() {
    let dir = TempDir::new().expect("tempdir");
    let pod = br#"{"status":{"phase":"Pending"}}"#;
    let orch = provisioned(&dir, RecordingPlatform::with_status(pod, LOAD_BALANCER_SERVICE)).await;

    let err = orch.pod_ready("alice").await.expect_err("should not parse");
    assert!(matches!(err, ProvisionError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn failed_pod_query_is_an_upstream_failure() {
    let dir = TempDir::new().expect("tempdir");
    let platform = RecordingPlatform::failing(PlatformOp::Describe(
        sandbox_spawner::application::ResourceKind::Pod,
    ));
    let orch = provisioned(&dir, platform).await;

    let err = orch.pod_ready("alice").await.expect_err("query fails");
    assert_eq!(err.to_string(), "kubectl get pod failed: boom");
}

#[tokio::test]
async fn load_balancer_endpoint_is_ingress_ip_and_port() {
    let dir = TempDir::new().expect("tempdir");
    let platform = RecordingPlatform::new();
    let orch = provisioned(&dir, platform.clone()).await;

    assert_eq!(
        orch.service_endpoint("alice").await.expect("probe"),
        "192.0.2.10:5000"
    );
    assert_eq!(
        platform.calls().last().map(String::as_str),
        Some("get service ttyd-alice-service")
    );
}

#[tokio::test]
async fn pending_load_balancer_is_a_parse_failure() {
    let dir = TempDir::new().expect("tempdir");
    let service = br#"{"spec":{"type":"LoadBalancer","ports":[{"port":5000}]},"status":{}}"#;
    let orch = provisioned(&dir, RecordingPlatform::with_status(READY_POD, service)).await;

    let err = orch.service_endpoint("alice").await.expect_err("no ingress");
    assert!(matches!(err, ProvisionError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn node_port_endpoint_uses_the_pod_host() {
    let dir = TempDir::new().expect("tempdir");
    let service = br#"{"spec":{"type":"NodePort","ports":[{"port":5000,"nodePort":31234}]}}"#;
    let platform = RecordingPlatform::with_status(READY_POD, service);
    let orch = orchestrator_with(
        FileAccountStore::open(dir.path().join("data")),
        FakeIdentityApi::new(),
        platform.clone(),
        ServiceExposure::NodePort,
    );
    orch.create("alice").await.expect("create");

    assert_eq!(
        orch.service_endpoint("alice").await.expect("probe"),
        "10.0.0.7:31234"
    );
    assert!(platform.manifests()[0].contains("type: NodePort"));
    let calls = platform.calls();
    assert_eq!(
        calls[calls.len() - 2..],
        [
            "get service ttyd-alice-service",
            "get pod ttyd-alice-5d9c7-abcde"
        ]
    );
}

#[tokio::test]
async fn probes_do_not_touch_the_store() {
    let dir = TempDir::new().expect("tempdir");
    let orch = provisioned(&dir, RecordingPlatform::new()).await;
    let before = std::fs::read(dir.path().join("data")).expect("data file");

    orch.pod_ready("alice").await.expect("ready");
    orch.service_endpoint("alice").await.expect("endpoint");

    assert_eq!(std::fs::read(dir.path().join("data")).expect("data file"), before);
}
