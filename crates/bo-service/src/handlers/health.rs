//! Liveness probe.

/// Returns "OK" while the process is serving requests. Does not touch the
/// store.
pub async fn health_check() -> &'static str {
    "OK"
}
