//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor and components produce:
//!     → logging.rs (subscriber setup, component spans)
//!     → tracing.rs (Tracer handed to components)
//!
//! Consumers:
//!     → stdout (pretty in development, JSON otherwise)
//!     → any subscriber the application installs itself
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Component name and type flow through spans, not message text

pub mod logging;
pub mod tracing;

pub use self::tracing::Tracer;
