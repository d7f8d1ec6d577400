//! Parsing of `kubectl get <kind> <name> -o=json` status documents.
//!
//! Only the fields the probes need are modelled. A missing field or a
//! non-conforming structure is an error, never a default.

use serde::Deserialize;

use crate::domain::error::StatusParseError;

/// Where a workload service can be reached from outside the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAddress {
    /// Load-balancer ingress address and service port.
    LoadBalancer { host: String, port: u16 },
    /// Node port; the node address comes from the pod's `status.hostIP`.
    NodePort { node_port: u16 },
}

/// Whether the pod reports `Ready=True`.
///
/// A pod without a `Ready` condition is not ready; a pod without a
/// `status.conditions` array is malformed.
///
/// # Errors
///
/// Returns an error if the document is not a pod status document.
pub fn pod_ready(json: &[u8]) -> Result<bool, StatusParseError> {
    let doc: PodDocument = parse("pod", json)?;
    Ok(doc
        .status
        .conditions
        .iter()
        .find(|c| c.kind == "Ready")
        .is_some_and(|c| c.status == "True"))
}

/// IP address of the node the pod is scheduled on.
///
/// # Errors
///
/// Returns an error if the document is malformed or the pod is unscheduled.
pub fn pod_host_ip(json: &[u8]) -> Result<String, StatusParseError> {
    let doc: PodHostDocument = parse("pod", json)?;
    doc.status
        .host_ip
        .filter(|ip| !ip.is_empty())
        .ok_or(StatusParseError::MissingField {
            kind: "pod",
            field: "status.hostIP",
        })
}

/// Externally reachable address of a service.
///
/// # Errors
///
/// Returns an error if the document is malformed, has no ports, or (for a
/// load balancer) has no ingress address yet.
pub fn service_address(json: &[u8]) -> Result<ServiceAddress, StatusParseError> {
    let doc: ServiceDocument = parse("service", json)?;
    let port = doc.spec.ports.first().ok_or(StatusParseError::MissingField {
        kind: "service",
        field: "spec.ports",
    })?;

    if doc.spec.type_.as_deref() == Some("NodePort") {
        let node_port = port.node_port.ok_or(StatusParseError::MissingField {
            kind: "service",
            field: "spec.ports[0].nodePort",
        })?;
        return Ok(ServiceAddress::NodePort { node_port });
    }

    let host = doc
        .status
        .and_then(|s| s.load_balancer)
        .and_then(|lb| lb.ingress)
        .and_then(|ingress| ingress.into_iter().next())
        .and_then(|entry| entry.ip.or(entry.hostname))
        .ok_or(StatusParseError::MissingField {
            kind: "service",
            field: "status.loadBalancer.ingress",
        })?;
    Ok(ServiceAddress::LoadBalancer {
        host,
        port: port.port,
    })
}

fn parse<'a, T: Deserialize<'a>>(
    kind: &'static str,
    json: &'a [u8],
) -> Result<T, StatusParseError> {
    serde_json::from_slice(json).map_err(|source| StatusParseError::Malformed { kind, source })
}

// ── Document shapes ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PodDocument {
    status: PodStatus,
}

#[derive(Deserialize)]
struct PodStatus {
    conditions: Vec<PodCondition>,
}

#[derive(Deserialize)]
struct PodCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

#[derive(Deserialize)]
struct PodHostDocument {
    status: PodHostStatus,
}

#[derive(Deserialize)]
struct PodHostStatus {
    #[serde(rename = "hostIP")]
    host_ip: Option<String>,
}

#[derive(Deserialize)]
struct ServiceDocument {
    spec: ServiceSpec,
    status: Option<ServiceStatus>,
}

#[derive(Deserialize)]
struct ServiceSpec {
    #[serde(rename = "type")]
    type_: Option<String>,
    ports: Vec<ServicePort>,
}

#[derive(Deserialize)]
struct ServicePort {
    port: u16,
    #[serde(rename = "nodePort")]
    node_port: Option<u16>,
}

#[derive(Deserialize)]
struct ServiceStatus {
    #[serde(rename = "loadBalancer")]
    load_balancer: Option<LoadBalancerStatus>,
}

#[derive(Deserialize)]
struct LoadBalancerStatus {
    ingress: Option<Vec<Ingress>>,
}

#[derive(Deserialize)]
struct Ingress {
    ip: Option<String>,
    hostname: Option<String>,
}
