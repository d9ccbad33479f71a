//! Shared helpers for Gavelpoint integration tests.
//!
//! The tests in `tests/` drive a running portal (and through it, a running
//! auction backend) over HTTP. They are `#[ignore]`d by default; run them
//! with `cargo test -p gavelpoint-integration-tests -- --ignored` once both
//! processes are up.

#![cfg_attr(not(test), forbid(unsafe_code))]

/// Base URL for the portal (configurable via environment).
#[must_use]
pub fn portal_base_url() -> String {
    std::env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Operator credentials for live login tests.
#[must_use]
pub fn operator_credentials() -> Option<(String, String)> {
    let email = std::env::var("PORTAL_TEST_EMAIL").ok()?;
    let password = std::env::var("PORTAL_TEST_PASSWORD").ok()?;
    Some((email, password))
}
