//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! `kubectl` adapter, the identity API client, and the account data file.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::server` are forbidden.

pub mod command_runner;
pub mod identity_api;
pub mod kubectl;
pub mod store;
pub mod token;
