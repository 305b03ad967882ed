//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML) or defaults
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc<AppContext> to all tasks
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once the supervisor is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Handlers, log sinks and resources are not serializable and are supplied
//!   through `SupervisorBuilder` instead

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load_settings;
pub use schema::{HttpSettings, LoggingSettings, Settings, ShutdownSettings};
