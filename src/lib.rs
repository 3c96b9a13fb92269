//! Score board server library.
//!
//! Accepts percent-encoded score submissions over HTTP and appends each one,
//! keyed by its own decoded text, to a JSON record store on disk. GET returns
//! the store document as it currently is on disk.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{Record, RecordStore, StoreError};
