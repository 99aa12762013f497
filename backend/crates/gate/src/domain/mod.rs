//! Domain Layer
//!
//! Role taxonomy, portal definitions, guard state, session events, and the
//! traits for the two external collaborators (identity provider, role directory).

pub mod capability;
pub mod entity;
pub mod repository;
pub mod taxonomy;
pub mod value_object;

// Re-exports
pub use capability::{Capability, NavItem, can};
pub use entity::{
    guard_state::{DenyReason, GuardState},
    portal_definition::{DeniedRedirect, PortalDefinition},
    role_record::RoleRecord,
    session::{SessionEvent, SessionPublisher, SessionSubscription},
};
pub use repository::{IdentityProvider, RoleDirectory, SignedInSession};
pub use value_object::{portal_id::PortalId, role_tag::RoleTag, uid::Uid};
