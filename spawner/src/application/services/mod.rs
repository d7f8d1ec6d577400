//! Application services: use-case orchestration.
//!
//! Each service module implements use-cases by composing domain logic with
//! port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra` or `crate::server`.

pub mod identity_locks;
pub mod probes;
pub mod provisioning;

pub use provisioning::{Orchestrator, ProvisionSettings};
