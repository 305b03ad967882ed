//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → health routes (draining guard, probes, status report)
//!     → Send to client
//! ```

pub mod server;

pub use server::{HttpServer, ServerControl};
