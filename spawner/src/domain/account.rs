//! Account domain types and pure naming functions.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Externally reachable service ports handed out to workloads, in allocation order.
pub const SERVICE_PORT_RANGE: Range<u16> = 5000..10000;

/// Prefix of every workload name.
pub const WORKLOAD_PREFIX: &str = "ttyd-";

/// Longest slug kept from the identity before the hash suffix is appended.
///
/// Keeps `<prefix><slug>-<hash>-credentials` within the 63-character DNS label limit.
const MAX_SLUG_LEN: usize = 37;

/// Hex digits of the identity hash appended to lossy slugs.
const HASH_SUFFIX_LEN: usize = 8;

/// Durable provisioning state of one identity.
///
/// Replaced whole, never patched. `Debug` redacts the two credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub identity: String,
    pub workload_name: String,
    pub pod_handle: String,
    pub service_name: String,
    pub secret_name: String,
    pub service_port: u16,
    pub auth_token: String,
    pub external_account_id: String,
    pub external_account_token: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("identity", &self.identity)
            .field("workload_name", &self.workload_name)
            .field("pod_handle", &self.pod_handle)
            .field("service_name", &self.service_name)
            .field("secret_name", &self.secret_name)
            .field("service_port", &self.service_port)
            .field("auth_token", &"<redacted>")
            .field("external_account_id", &self.external_account_id)
            .field("external_account_token", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account created for an identity by the identity API.
#[derive(Clone, PartialEq, Eq)]
pub struct ExternalAccount {
    pub id: String,
    pub access_token: String,
}

impl fmt::Debug for ExternalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalAccount")
            .field("id", &self.id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Platform object names derived from one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadNames {
    /// Deployment name; also the container name and the `app` label value.
    pub workload: String,
    pub service: String,
    pub secret: String,
}

impl WorkloadNames {
    /// Label selector matching the pods of this workload.
    #[must_use]
    pub fn selector(&self) -> String {
        format!("app={}", self.workload)
    }
}

/// Derive platform object names for `identity`.
///
/// Identities that are already lowercase DNS-safe map to `ttyd-<identity>`.
/// Anything else is slugged and suffixed with a hash of the full identity, so
/// two identities never share a workload name.
#[must_use]
pub fn workload_names(identity: &str) -> WorkloadNames {
    let slug = slugify(identity);
    let workload = if !slug.is_empty() && slug == identity && slug.len() <= MAX_SLUG_LEN {
        format!("{WORKLOAD_PREFIX}{slug}")
    } else {
        let hash = identity_hash(identity);
        let slug = truncate_slug(&slug);
        if slug.is_empty() {
            format!("{WORKLOAD_PREFIX}{hash}")
        } else {
            format!("{WORKLOAD_PREFIX}{slug}-{hash}")
        }
    };
    WorkloadNames {
        service: format!("{workload}-service"),
        secret: format!("{workload}-credentials"),
        workload,
    }
}

fn slugify(identity: &str) -> String {
    let mapped: String = identity
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect();
    mapped.trim_matches('-').to_string()
}

fn truncate_slug(slug: &str) -> &str {
    // slugify output is ASCII, so byte slicing is safe.
    slug[..slug.len().min(MAX_SLUG_LEN)].trim_end_matches('-')
}

fn identity_hash(identity: &str) -> String {
    let digest = Sha256::digest(identity.as_bytes());
    digest
        .iter()
        .take(HASH_SUFFIX_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect()
}
