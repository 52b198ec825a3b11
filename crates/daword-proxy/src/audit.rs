//! Audit logging for proxy requests.
//!
//! Every request is logged with structured fields via `tracing`. Request
//! bodies (which carry sign-in credentials) and cookies are never logged.

use crate::route::Route;
use tracing::{info, warn};

/// Log a response generated by the proxy itself.
pub fn log_local(route: Route, method: &str, path: &str, status: u16) {
    info!(
        target: "daword_proxy::audit",
        route = route.name(),
        method = method,
        path = path,
        status = status,
        "local response"
    );
}

/// Log a response relayed from the internal origin.
pub fn log_forwarded(method: &str, path: &str, origin: &str, status: u16) {
    info!(
        target: "daword_proxy::audit",
        route = "forward",
        method = method,
        path = path,
        origin = origin,
        status = status,
        "forwarded response"
    );
}

/// Log a forwarding failure answered with a 500.
pub fn log_proxy_error(method: &str, path: &str, origin: &str, reason: &str) {
    warn!(
        target: "daword_proxy::audit",
        route = "forward",
        method = method,
        path = path,
        origin = origin,
        reason = reason,
        "proxy error"
    );
}
