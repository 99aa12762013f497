//! Presentation Layer
//!
//! Portal registry, HTTP handlers, DTOs, router, and the guard middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod router;

pub use handlers::{GateAppState, PortalState};
pub use middleware::{PortalAccess, require_portal_access};
pub use registry::PortalRegistry;
pub use router::{gate_router, portal_router};
