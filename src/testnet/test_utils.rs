//! Test utilities for chain manager testing

use crate::core::ChainManager;
use crate::error::{BlockchainError, Result};
use crate::storage::{ChainStore, MemoryStore, SledStore};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a chain manager over an empty in-memory store
pub fn create_test_manager() -> ChainManager<MemoryStore> {
    ChainManager::new(MemoryStore::new())
}

/// Create a chain manager over a sled database in a temporary directory
pub fn create_sled_manager() -> Result<(ChainManager<SledStore>, TempDir)> {
    let temp_dir = tempfile::tempdir().map_err(|e| BlockchainError::Io(e.to_string()))?;
    let store = SledStore::open(temp_dir.path().join("test_chain"))?;
    Ok((ChainManager::new(store), temp_dir))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Block,
    Transaction,
    Enumerate,
}

/// Memory store that can be told to fail one kind of operation
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: Mutex<Option<StoreOp>>,
}

impl FailingStore {
    pub fn new() -> FailingStore {
        FailingStore::default()
    }

    pub fn fail_on(&self, op: StoreOp) {
        *self.failing.lock().unwrap() = Some(op);
    }

    pub fn clear_failure(&self) {
        *self.failing.lock().unwrap() = None;
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, op: StoreOp) -> Result<()> {
        if *self.failing.lock().unwrap() == Some(op) {
            return Err(BlockchainError::Database(format!(
                "injected {op:?} failure"
            )));
        }
        Ok(())
    }
}

impl ChainStore for FailingStore {
    fn store_block(&self, hash: &str, bytes: &[u8], expected_last: Option<&str>) -> Result<()> {
        self.check(StoreOp::Block)?;
        self.inner.store_block(hash, bytes, expected_last)
    }

    fn store_transaction(&self, id: &[u8], bytes: &[u8]) -> Result<()> {
        self.check(StoreOp::Transaction)?;
        self.inner.store_transaction(id, bytes)
    }

    fn last_block(&self) -> Result<Vec<u8>> {
        self.inner.last_block()
    }

    fn last_block_hash(&self) -> Result<Option<String>> {
        self.inner.last_block_hash()
    }

    fn blocks(&self) -> Result<Vec<Vec<u8>>> {
        self.check(StoreOp::Enumerate)?;
        self.inner.blocks()
    }

    fn block(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        self.inner.block(hash)
    }

    fn transaction(&self, id: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.transaction(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sled_manager() {
        let (manager, _temp_dir) = create_sled_manager().unwrap();
        let (genesis, existed) = manager.create_blockchain("alice").unwrap();
        assert!(!existed);
        assert_eq!(manager.verify_chain().unwrap(), 1);
        assert_eq!(manager.get_genesis_block().unwrap(), genesis);
    }

    #[test]
    fn test_failing_store_only_fails_selected_op() {
        let store = FailingStore::new();
        store.fail_on(StoreOp::Transaction);
        assert!(store.store_block("aa", b"x", None).is_ok());
        assert!(store.store_transaction(b"id", b"x").is_err());
        assert_eq!(store.blocks().unwrap().len(), 1);
    }
}
