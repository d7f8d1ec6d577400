//! Binary-level checks of startup configuration handling.

use assert_cmd::Command;
use predicates::prelude::*;

fn spawner() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sandbox-spawner"));
    for var in [
        "SPAWNER_PORT",
        "SPAWNER_SSL_CERTIFICATE",
        "SPAWNER_SSL_KEY",
        "SPAWNER_IDENTITY_ADMIN_TOKEN",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_every_setting() {
    let mut assert = spawner().arg("--help").assert().success();
    for flag in [
        "--port",
        "--ssl-certificate",
        "--ssl-key",
        "--identity-endpoint",
        "--identity-admin-token",
        "--data-path",
        "--namespace",
        "--workload-image",
        "--credentials-mount",
        "--service-type",
        "--kubectl-timeout-secs",
        "--http-timeout-secs",
    ] {
        assert = assert.stdout(predicate::str::contains(flag));
    }
}

#[test]
fn version_flag_shows_name() {
    spawner()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sandbox-spawner"));
}

#[test]
fn admin_token_is_required() {
    spawner()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--identity-admin-token"));
}

#[test]
fn invalid_port_is_fatal() {
    spawner()
        .args(["--identity-admin-token", "admin", "--port", "not-a-port"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--port"));
}

#[test]
fn invalid_port_from_env_is_fatal() {
    spawner()
        .env("SPAWNER_PORT", "0")
        .env("SPAWNER_IDENTITY_ADMIN_TOKEN", "admin")
        .assert()
        .code(2);
}

#[test]
fn certificate_without_key_is_fatal() {
    spawner()
        .args([
            "--identity-admin-token",
            "admin",
            "--ssl-certificate",
            "cert.pem",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--ssl-key"));
}

#[test]
fn unknown_service_type_is_fatal() {
    spawner()
        .args(["--identity-admin-token", "admin", "--service-type", "cluster-ip"])
        .assert()
        .code(2);
}
