//! Session-related types.
//!
//! The session is the bag's only home: handlers read the bag out, mutate a
//! copy, and write it back. The stored shape is the wire shape documented
//! on [`thread_harbor_core::Bag`].

/// Session keys for storefront data.
pub mod keys {
    /// Key for the session shopping bag.
    pub const BAG: &str = "bag";
}
