//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`
//! or `crate::server`.

pub mod ports;
pub mod services;

pub use ports::{
    AccountStore, CommandRunner, IdentityApi, ResourceKind, TokenSource, WorkloadPlatform,
};
pub use services::{Orchestrator, ProvisionSettings};
