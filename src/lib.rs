//! Process supervisor library.
//!
//! Owns a set of [`component::Component`]s plus an HTTP health listener,
//! starts them concurrently and stops them in a bounded, ordered sequence
//! when the process is asked to terminate.

pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod supervisor;

pub use component::{Component, ComponentRegistry, Resources};
pub use config::Settings;
pub use error::{Error, Result};
pub use health::{Health, HealthRoute, HealthRoutes, HealthStatus};
pub use lifecycle::{ShutdownHandle, ShutdownState};
pub use supervisor::{Outcome, Supervisor, SupervisorBuilder};
