//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod guard;
pub mod mount;
pub mod redirect;
pub mod role_cache;
pub mod sign_in;
pub mod sign_out;

// Re-exports
pub use config::GateConfig;
pub use guard::{LookupOutcome, LookupTicket, PortalGuard};
pub use mount::{MountedGuard, mount};
pub use redirect::{GuardView, RedirectPolicy};
pub use role_cache::{CachedRoleDirectory, RoleCache};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
