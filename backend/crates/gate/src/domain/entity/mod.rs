//! Entity Module

pub mod guard_state;
pub mod portal_definition;
pub mod role_record;
pub mod session;
