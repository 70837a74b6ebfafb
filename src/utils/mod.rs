//! Utility functions and helpers
//!
//! Digest, clock and bincode helpers shared by the block and transaction code.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest};

pub use serialization::{deserialize, serialize};
