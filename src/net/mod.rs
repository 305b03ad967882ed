//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Start-up:
//!     listener::probe (port free?) → fail fast with PortUnavailable
//!
//! Serve:
//!     listener::bind → hand off to the HTTP layer
//! ```

pub mod listener;
