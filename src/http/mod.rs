//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → server.rs (middleware: request ID, trace, body limit, timeout)
//!     → handlers.rs (method dispatch)
//!         GET  → stream store document
//!         POST → decode.rs → store::RecordStore::append_if_absent → response.rs
//!     → error.rs (failures mapped to status codes)
//! ```

pub mod decode;
pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use decode::{decode_submission, DecodeError};
pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
