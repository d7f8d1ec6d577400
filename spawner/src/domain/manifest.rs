//! Typed Kubernetes documents for one sandbox workload.
//!
//! The manifest is a Secret holding the identity-API credentials, a Deployment
//! running `ttyd` behind the user's auth token, and a Service exposing it on the
//! allocated port. Values are placed into typed fields and serialized with
//! `serde_yaml`, so identities and tokens are always quoted correctly.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::domain::account::WorkloadNames;

/// Port `ttyd` listens on inside the container.
pub const TTYD_PORT: u16 = 7681;

const SECRET_VOLUME: &str = "identity-credentials";

/// How the workload service is exposed outside the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceExposure {
    #[default]
    LoadBalancer,
    NodePort,
}

impl ServiceExposure {
    /// Kubernetes `spec.type` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadBalancer => "LoadBalancer",
            Self::NodePort => "NodePort",
        }
    }
}

/// Cluster-wide settings that shape every workload.
#[derive(Debug, Clone)]
pub struct WorkloadSettings {
    pub image: String,
    /// Where the credential secret is mounted inside the container.
    pub credentials_mount: String,
    pub exposure: ServiceExposure,
}

/// Per-workload values substituted into the manifest.
pub struct WorkloadParams<'a> {
    pub names: &'a WorkloadNames,
    pub auth_token: &'a str,
    pub service_port: u16,
    pub external_account_token: &'a str,
    pub identity_endpoint: &'a str,
}

/// Render the full multi-document manifest.
///
/// # Errors
///
/// Returns an error only if YAML serialization fails.
pub fn render(
    settings: &WorkloadSettings,
    params: &WorkloadParams<'_>,
) -> Result<String, serde_yaml::Error> {
    let docs = [
        serde_yaml::to_string(&secret(params))?,
        serde_yaml::to_string(&deployment(settings, params))?,
        serde_yaml::to_string(&service(settings, params))?,
    ];
    Ok(docs.join("---\n"))
}

// ── Document builders ─────────────────────────────────────────────────────────

fn secret(params: &WorkloadParams<'_>) -> Secret {
    let mut data = BTreeMap::new();
    data.insert("token", STANDARD.encode(params.external_account_token));
    data.insert("endpoint", STANDARD.encode(params.identity_endpoint));
    Secret {
        api_version: "v1",
        kind: "Secret",
        metadata: Metadata::named(&params.names.secret),
        type_: "Opaque",
        data,
    }
}

fn deployment(settings: &WorkloadSettings, params: &WorkloadParams<'_>) -> Deployment {
    let name = &params.names.workload;
    let labels = app_labels(name);
    Deployment {
        api_version: "apps/v1",
        kind: "Deployment",
        metadata: Metadata {
            name: name.clone(),
            labels: Some(labels.clone()),
        },
        spec: DeploymentSpec {
            replicas: 1,
            selector: LabelSelector {
                match_labels: labels.clone(),
            },
            template: PodTemplate {
                metadata: TemplateMetadata { labels },
                spec: PodSpec {
                    containers: vec![Container {
                        name: name.clone(),
                        image: settings.image.clone(),
                        command: vec!["ttyd".to_string()],
                        args: vec![
                            "-c".to_string(),
                            params.auth_token.to_string(),
                            "bash".to_string(),
                        ],
                        image_pull_policy: "IfNotPresent",
                        ports: vec![ContainerPort {
                            container_port: TTYD_PORT,
                            name: "ttyd",
                        }],
                        volume_mounts: vec![VolumeMount {
                            name: SECRET_VOLUME,
                            mount_path: settings.credentials_mount.clone(),
                        }],
                    }],
                    volumes: vec![Volume {
                        name: SECRET_VOLUME,
                        secret: SecretVolumeSource {
                            secret_name: params.names.secret.clone(),
                        },
                    }],
                },
            },
        },
    }
}

fn service(settings: &WorkloadSettings, params: &WorkloadParams<'_>) -> Service {
    Service {
        api_version: "v1",
        kind: "Service",
        metadata: Metadata::named(&params.names.service),
        spec: ServiceSpec {
            selector: app_labels(&params.names.workload),
            type_: settings.exposure.as_str(),
            ports: vec![ServicePort {
                protocol: "TCP",
                port: params.service_port,
                target_port: TTYD_PORT,
            }],
        },
    }
}

fn app_labels(name: &str) -> BTreeMap<&'static str, String> {
    BTreeMap::from([("app", name.to_string())])
}

// ── Serialized shapes ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Metadata {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<BTreeMap<&'static str, String>>,
}

impl Metadata {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            labels: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Secret {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    #[serde(rename = "type")]
    type_: &'static str,
    data: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Deployment {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: DeploymentSpec,
}

#[derive(Serialize)]
struct DeploymentSpec {
    replicas: u32,
    selector: LabelSelector,
    template: PodTemplate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelSelector {
    match_labels: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
struct PodTemplate {
    metadata: TemplateMetadata,
    spec: PodSpec,
}

#[derive(Serialize)]
struct TemplateMetadata {
    labels: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
struct PodSpec {
    containers: Vec<Container>,
    volumes: Vec<Volume>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Container {
    name: String,
    image: String,
    command: Vec<String>,
    args: Vec<String>,
    image_pull_policy: &'static str,
    ports: Vec<ContainerPort>,
    volume_mounts: Vec<VolumeMount>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerPort {
    container_port: u16,
    name: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeMount {
    name: &'static str,
    mount_path: String,
}

#[derive(Serialize)]
struct Volume {
    name: &'static str,
    secret: SecretVolumeSource,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretVolumeSource {
    secret_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Service {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: ServiceSpec,
}

#[derive(Serialize)]
struct ServiceSpec {
    selector: BTreeMap<&'static str, String>,
    #[serde(rename = "type")]
    type_: &'static str,
    ports: Vec<ServicePort>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServicePort {
    protocol: &'static str,
    port: u16,
    target_port: u16,
}
