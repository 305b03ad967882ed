//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start-up (orchestrator.rs):
//!     Inject capabilities → init (in order) → start (concurrent)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Flag draining → Stop listener → Stop components (in order)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered init: one component at a time, every failure collected
//! - Ordered stop: listener first, then components in registration order
//! - Shutdown has a window: work still running past it is abandoned

pub mod errors;
pub mod orchestrator;
pub mod shutdown;
pub mod signals;

pub use errors::ErrorSet;
pub use orchestrator::{init_all, start_all, stop_all, Injections};
pub use shutdown::{
    DrainFlag, ShutdownCoordinator, ShutdownHandle, ShutdownState, ShutdownWindow, Trigger,
};
pub use signals::TerminationSignals;
