//! Hashing primitives for the grant fund.
//!
//! - **Blake2b-256** for content-addressed proposal ids
//! - Slate hashes over ordered lists of proposal ids

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, hash_proposal, hash_slate};
