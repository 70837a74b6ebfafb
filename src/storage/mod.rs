//! Data storage and persistence
//!
//! [`ChainStore`] is everything the chain manager needs from a key-value store.
//! [`SledStore`] persists to disk; [`MemoryStore`] keeps the same layout in a
//! process-local map.

pub mod memory_store;
pub mod sled_store;

pub use memory_store::MemoryStore;
pub use sled_store::SledStore;

use crate::error::Result;

pub trait ChainStore {
    /// Writes `bytes` under `hash` and moves the last-block pointer to `hash` in
    /// one atomic step. Fails with `TipMoved` when the pointer is not currently
    /// `expected_last` (`None` means no block has been written yet).
    fn store_block(&self, hash: &str, bytes: &[u8], expected_last: Option<&str>) -> Result<()>;

    fn store_transaction(&self, id: &[u8], bytes: &[u8]) -> Result<()>;

    /// Bytes of the block the last-block pointer names, or `NotInitialized`.
    fn last_block(&self) -> Result<Vec<u8>>;

    fn last_block_hash(&self) -> Result<Option<String>>;

    /// Every stored block, in whatever order the store keeps them.
    fn blocks(&self) -> Result<Vec<Vec<u8>>>;

    fn block(&self, hash: &str) -> Result<Option<Vec<u8>>>;

    fn transaction(&self, id: &[u8]) -> Result<Option<Vec<u8>>>;
}
