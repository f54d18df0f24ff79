//! Dependency audit tests for the platform manifest.
// Audit test file: panic is an intentional test mechanism.
#![allow(clippy::panic)]
//! Firmware builds pull in `platform` with no features; everything that only
//! the host mocks need must stay out of that build.
//!
//! Run with: cargo test -p platform --test dependency_audit

const MANIFEST: &str = include_str!("../Cargo.toml");

/// Line declaring `name` under `[dependencies]`.
fn production_dependency(name: &str) -> &'static str {
    let dependencies = MANIFEST
        .split("[dependencies]")
        .nth(1)
        .and_then(|rest| rest.split("\n[").next())
        .unwrap_or_else(|| panic!("Cargo.toml must have a [dependencies] table"));
    dependencies
        .lines()
        .find(|line| line.trim_start().starts_with(name))
        .unwrap_or_else(|| panic!("{name} must be listed under [dependencies]"))
}

/// heapless only backs the mock engine, so no_std builds must not link it.
#[test]
fn heapless_is_optional_in_production_builds() {
    let line = production_dependency("heapless");
    assert!(
        line.contains("optional = true"),
        "heapless must be optional (mocks only), got: {line}"
    );
}

/// The `std` feature is what turns the mocks, and with them heapless, on.
#[test]
fn std_feature_enables_heapless() {
    let std_feature = MANIFEST
        .lines()
        .find(|line| line.trim_start().starts_with("std"))
        .unwrap_or_else(|| panic!("platform must declare a std feature"));
    assert!(
        std_feature.contains("dep:heapless"),
        "std feature must enable heapless, got: {std_feature}"
    );
}

/// Unit tests build the mocks without the std feature; heapless must still resolve.
#[test]
fn heapless_is_a_dev_dependency() {
    let dev = MANIFEST
        .split("[dev-dependencies]")
        .nth(1)
        .and_then(|rest| rest.split("\n[").next())
        .unwrap_or_else(|| panic!("Cargo.toml must have a [dev-dependencies] table"));
    assert!(
        dev.lines().any(|line| line.trim_start().starts_with("heapless")),
        "heapless must be a dev-dependency for cfg(test) mocks"
    );
}
