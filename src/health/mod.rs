//! Health endpoints subsystem.
//!
//! # Data Flow
//! ```text
//! GET /.well-known/health/{startup,alive,ready,status}
//!     → routes.rs (route table, draining guard)
//!     → handlers.rs (default probes) or a custom handler
//!     → model.rs (status report)
//! ```
//!
//! # Design Decisions
//! - Routes are independently optional; a disabled route is simply absent
//! - The draining flag wins over every handler, custom ones included
//! - Components opt into the status report via `ReportsHealth`

pub mod handlers;
pub mod model;
pub mod routes;

pub use handlers::HealthState;
pub use model::{format_uptime, Health, HealthMeta, HealthStatus};
pub use routes::{HealthRoute, HealthRoutes, BASE_PATH};
