//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod account;
pub mod error;
pub mod manifest;
pub mod status;

pub use account::{
    AccountRecord, ExternalAccount, SERVICE_PORT_RANGE, WorkloadNames, workload_names,
};
pub use error::{ProvisionError, StatusParseError, StoreError};
pub use manifest::{ServiceExposure, WorkloadSettings};
pub use status::ServiceAddress;
