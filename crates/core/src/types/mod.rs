//! Core types for Gavelpoint.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod date_key;
pub mod email;
pub mod id;
pub mod role;

pub use date_key::{DateKey, DateKeyError};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::UserRole;
