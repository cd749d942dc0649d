//! Sykli CI pipeline for the status service
//!
//! Run locally: sykli run
//! Or: cargo run --bin sykli --features sykli -- --emit | sykli run -

use sykli::{Condition, Pipeline, Template};

fn main() {
    let mut p = Pipeline::new();

    // === RESOURCES ===
    let src = p.dir(".");
    let cargo_registry = p.cache("cargo-registry");
    let cargo_git = p.cache("cargo-git");
    let target_cache = p.cache("target");

    // === TEMPLATE ===
    let rust = Template::new()
        .container("rust:1.85")
        .mount_dir(&src, "/src")
        .mount_cache(&cargo_registry, "/usr/local/cargo/registry")
        .mount_cache(&cargo_git, "/usr/local/cargo/git")
        .mount_cache(&target_cache, "/src/target")
        .workdir("/src");

    // === TASKS ===

    let _ = p
        .task("test")
        .from(&rust)
        .run("cargo test")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("lint")
        .from(&rust)
        .run("cargo clippy --all-targets --all-features -- -D warnings")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("fmt")
        .from(&rust)
        .run("cargo fmt -- --check")
        .inputs(&["**/*.rs"]);

    let _ = p
        .task("build")
        .from(&rust)
        .run("cargo build --release --bin status-service")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"])
        .output("binary", "target/release/status-service")
        .after(&["test", "lint", "fmt"]);

    // Boot the binary, probe each endpoint, then check SIGTERM shuts it down cleanly
    let _ = p
        .task("smoke-test")
        .from(&rust)
        .run(
            r#"#!/bin/bash
set -e

PORT=18080 ENVIRONMENT=ci RUST_LOG=info ./target/release/status-service 2>&1 | tee /tmp/status-log.txt &
sleep 2
PID=$(pgrep -f target/release/status-service)

curl -fsS http://127.0.0.1:18080/ | grep -q '"environment":"ci"'
curl -fsS http://127.0.0.1:18080/health | grep -q '"status":"healthy"'
curl -fsS http://127.0.0.1:18080/ready | grep -q '"status":"ready"'

kill -TERM "$PID"
sleep 1

if ! grep -q "Received termination signal" /tmp/status-log.txt; then
  echo "ERROR: SIGTERM was not handled"
  cat /tmp/status-log.txt
  exit 1
fi
if ! grep -q "Shutting down status service" /tmp/status-log.txt; then
  echo "ERROR: service did not shut down cleanly"
  cat /tmp/status-log.txt
  exit 1
fi

echo "Smoke test passed"
"#,
        )
        .input_from("build", "binary", "/src/target/release/status-service")
        .when_cond(Condition::event("push").or(Condition::negate(Condition::branch("*"))))
        .timeout(120);

    p.emit();
}
