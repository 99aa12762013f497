//! Infrastructure Layer
//!
//! Identity provider and role directory implementations.

pub mod memory;
pub mod postgres;
pub mod seed;
