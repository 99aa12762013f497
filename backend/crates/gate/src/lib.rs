//! Portal Access-Control Gate
//!
//! Clean Architecture structure:
//! - `domain/` - Role taxonomy, portal definitions, guard state, collaborator traits
//! - `application/` - Guard state machine, guard mount, redirect policy, use cases
//! - `infra/` - In-memory and PostgreSQL providers
//! - `presentation/` - Portal registry, guard middleware, handlers, router
//!
//! ## Admission Model
//! - One closed set of role tags; each portal admits its domain roles plus
//!   the override roles its policy names
//! - A guard per mounted portal observes the browser session, looks the
//!   caller's role up, and settles on authorized, denied, or signed out
//! - Fail-closed: missing records, missing roles, lookup errors and
//!   timeouts all deny
//! - Newer session events always win over in-flight lookups

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::GateConfig;
pub use error::{GateError, GateResult};
pub use infra::memory::{InMemoryIdentityProvider, InMemoryRoleDirectory};
pub use infra::postgres::PgRoleDirectory;
pub use presentation::{GateAppState, PortalRegistry, gate_router};

// Kernel types returned by `GateError::to_app_error` and `GateError::kind`
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
