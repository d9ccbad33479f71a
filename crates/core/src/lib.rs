//! Gavelpoint Core - Shared types library.
//!
//! This crate provides common types used across all Gavelpoint components:
//! - `portal` - Server-rendered operator front-end for the auction backend
//! - `integration-tests` - Live end-to-end tests against a running portal
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and
//!   calendar-date keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
