//! Nutriharvest Core - Shared domain types.
//!
//! This crate provides the data shapes used across the Nutriharvest
//! storefront components:
//! - `storefront` - Interaction layer driving the shopper-facing pages
//! - `integration-tests` - Stub backend and end-to-end flows
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The records
//! mirror the JSON the backend returns; the client never enforces invariants
//! on them beyond what deserialization requires.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`model`] - Entity records (users, catalog, orders, dashboard)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod model;
pub mod types;

pub use model::*;
pub use types::*;
