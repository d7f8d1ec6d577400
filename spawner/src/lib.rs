//! Sandbox spawner library: exposes modules for the binary and integration
//! testing.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod application;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod server;
