//! Thread Harbor Core - Shared domain library.
//!
//! This crate provides the types and logic shared across Thread Harbor
//! components:
//! - `storefront` - Public-facing e-commerce site
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The bag pricing engine lives here so it can be
//! tested in isolation and reused by any surface that needs priced bag data.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the `Price` money type, and catalog entities
//! - [`bag`] - The session shopping bag model, mutation operations, and the
//!   pricing engine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bag;
pub mod types;

pub use bag::*;
pub use types::*;
