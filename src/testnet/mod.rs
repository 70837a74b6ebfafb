//! Test harness for the chain manager
//!
//! In-memory and temporary sled managers, plus a store that fails on demand
//! for exercising the partial-write paths.

pub mod test_utils;

pub use test_utils::*;
