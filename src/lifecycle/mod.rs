//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Load store → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a store that cannot be loaded stops startup before binding
//! - No flush on exit: every insert is already on disk

pub mod shutdown;
pub mod signals;

pub use shutdown::{shutdown_requested, Shutdown};
pub use signals::shutdown_signal;
