//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by every crate in the workspace:
//! - Unified error type ([`error::app_error::AppError`]) and its classification
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is identical across all portals belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
