//! Core types for Thread Harbor.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod product;

pub use id::*;
pub use money::Price;
pub use product::{Category, Product};
