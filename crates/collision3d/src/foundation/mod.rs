//! Foundation module - Core utilities and types
//!
//! - Math types and the `Transform` driving collider updates
//! - Logging utilities

pub mod math;
pub mod logging;
