//! Value Object Module

pub mod portal_id;
pub mod role_tag;
pub mod uid;
