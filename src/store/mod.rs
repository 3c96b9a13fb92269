//! Record store subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     database.json
//!     → record_store.rs (parse into BTreeMap<String, Record>)
//!     → RecordStore (shared via Arc by all handlers)
//!
//! POST submission:
//!     append_if_absent(key, record)
//!     → key present?  yes → Ok(false), no I/O
//!     → serialize mapping + new entry → temp file → rename over document
//!     → commit entry to memory → Ok(true)
//! ```
//!
//! # Design Decisions
//! - Append-only: keys are never overwritten or removed
//! - Write-then-commit: a failed write never changes the in-memory view
//! - Whole-document rewrite keeps the file complete after every insert

pub mod error;
pub mod record_store;

pub use error::StoreError;
pub use record_store::{Record, RecordStore};
