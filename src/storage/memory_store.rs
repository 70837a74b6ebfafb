use crate::error::{BlockchainError, Result};
use crate::storage::ChainStore;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct MemoryState {
    blocks: HashMap<String, Vec<u8>>,       // K -> block hash, V -> block bytes
    transactions: HashMap<Vec<u8>, Vec<u8>>, // K -> txid, V -> transaction bytes
    last_block_hash: Option<String>,
}

/// Process-local [`ChainStore`]. Nothing survives the value being dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.inner.read().map_err(|_| {
            BlockchainError::Database("Failed to acquire read lock on memory store".to_string())
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.inner.write().map_err(|_| {
            BlockchainError::Database("Failed to acquire write lock on memory store".to_string())
        })
    }

    pub fn block_count(&self) -> Result<usize> {
        Ok(self.read()?.blocks.len())
    }

    pub fn transaction_count(&self) -> Result<usize> {
        Ok(self.read()?.transactions.len())
    }
}

impl ChainStore for MemoryStore {
    fn store_block(&self, hash: &str, bytes: &[u8], expected_last: Option<&str>) -> Result<()> {
        let mut state = self.write()?;
        if state.last_block_hash.as_deref() != expected_last {
            return Err(BlockchainError::TipMoved {
                expected: expected_last.map(str::to_string),
                actual: state.last_block_hash.clone(),
            });
        }
        state.blocks.insert(hash.to_string(), bytes.to_vec());
        state.last_block_hash = Some(hash.to_string());
        Ok(())
    }

    fn store_transaction(&self, id: &[u8], bytes: &[u8]) -> Result<()> {
        self.write()?
            .transactions
            .insert(id.to_vec(), bytes.to_vec());
        Ok(())
    }

    fn last_block(&self) -> Result<Vec<u8>> {
        let state = self.read()?;
        let hash = state
            .last_block_hash
            .as_ref()
            .ok_or(BlockchainError::NotInitialized)?;
        state.blocks.get(hash).cloned().ok_or_else(|| {
            BlockchainError::Database(format!("Last block {hash} is missing from the store"))
        })
    }

    fn last_block_hash(&self) -> Result<Option<String>> {
        Ok(self.read()?.last_block_hash.clone())
    }

    fn blocks(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self.read()?.blocks.values().cloned().collect())
    }

    fn block(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.blocks.get(hash).cloned())
    }

    fn transaction(&self, id: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.transactions.get(id).cloned())
    }
}
