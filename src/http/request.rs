//! Request inspection helpers.
//!
//! # Responsibilities
//! - Resolve the peer address recorded by the connection layer
//! - Expose the request ID assigned by `SetRequestIdLayer`

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::Request};
use tower_http::request_id::RequestId;

/// Header carrying the per-request UUID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Peer address of the connection, or `"unknown"` outside a live socket.
pub fn remote_addr<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Request ID assigned to this request, or `"unknown"` if none was set.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
