// Sled-backed chain storage. Blocks, transactions and the last-block pointer
// live in separate trees so that enumerating blocks never sees the pointer.

use crate::error::{BlockchainError, Result};
use crate::storage::ChainStore;
use log::{debug, info};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::{Path, PathBuf};

const BLOCKS_TREE: &str = "blocks";
const TRANSACTIONS_TREE: &str = "transactions";
const META_TREE: &str = "chain_meta";
const LAST_BLOCK_HASH_KEY: &str = "last_block_hash";

#[derive(Clone)]
pub struct SledStore {
    db: Db,
    blocks: Tree,
    transactions: Tree,
    meta: Tree,
    db_path: Option<PathBuf>,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SledStore> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)
            .map_err(|e| BlockchainError::Database(format!("Failed to open database: {e}")))?;
        info!("Opened chain database at {}", path.display());
        Self::from_db(db, Some(path))
    }

    /// Database that is removed when the last handle drops.
    pub fn open_temporary() -> Result<SledStore> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| {
                BlockchainError::Database(format!("Failed to open temporary database: {e}"))
            })?;
        Self::from_db(db, None)
    }

    fn from_db(db: Db, db_path: Option<PathBuf>) -> Result<SledStore> {
        let open = |name: &str| {
            db.open_tree(name).map_err(|e| {
                BlockchainError::Database(format!("Failed to open {name} tree: {e}"))
            })
        };
        let blocks = open(BLOCKS_TREE)?;
        let transactions = open(TRANSACTIONS_TREE)?;
        let meta = open(META_TREE)?;

        Ok(SledStore {
            db,
            blocks,
            transactions,
            meta,
            db_path,
        })
    }

    pub fn get_db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| BlockchainError::Database(format!("Failed to flush database: {e}")))?;
        Ok(())
    }
}

impl ChainStore for SledStore {
    fn store_block(&self, hash: &str, bytes: &[u8], expected_last: Option<&str>) -> Result<()> {
        (&self.blocks, &self.meta)
            .transaction(|(blocks, meta)| {
                let current = meta
                    .get(LAST_BLOCK_HASH_KEY)?
                    .map(|v| String::from_utf8_lossy(&v).into_owned());
                if current.as_deref() != expected_last {
                    return Err(ConflictableTransactionError::Abort(
                        BlockchainError::TipMoved {
                            expected: expected_last.map(str::to_string),
                            actual: current,
                        },
                    ));
                }
                blocks.insert(hash.as_bytes(), bytes)?;
                meta.insert(LAST_BLOCK_HASH_KEY, hash.as_bytes())?;
                Ok(())
            })
            .map_err(|e: TransactionError<BlockchainError>| match e {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => {
                    BlockchainError::Database(format!("Failed to store block {hash}: {err}"))
                }
            })?;

        debug!("Stored block {hash}");
        Ok(())
    }

    fn store_transaction(&self, id: &[u8], bytes: &[u8]) -> Result<()> {
        self.transactions.insert(id, bytes).map_err(|e| {
            BlockchainError::Database(format!("Failed to store transaction: {e}"))
        })?;
        Ok(())
    }

    fn last_block(&self) -> Result<Vec<u8>> {
        let hash = self
            .last_block_hash()?
            .ok_or(BlockchainError::NotInitialized)?;
        let bytes = self.block(&hash)?.ok_or_else(|| {
            BlockchainError::Database(format!("Last block {hash} is missing from the blocks tree"))
        })?;
        Ok(bytes)
    }

    fn last_block_hash(&self) -> Result<Option<String>> {
        let data = self
            .meta
            .get(LAST_BLOCK_HASH_KEY)
            .map_err(|e| BlockchainError::Database(format!("Failed to get last block hash: {e}")))?;

        data.map(|v| {
            String::from_utf8(v.to_vec()).map_err(|e| {
                BlockchainError::Database(format!("Invalid last block hash format: {e}"))
            })
        })
        .transpose()
    }

    fn blocks(&self) -> Result<Vec<Vec<u8>>> {
        self.blocks
            .iter()
            .values()
            .map(|item| {
                item.map(|v| v.to_vec()).map_err(|e| {
                    BlockchainError::Database(format!("Failed to iterate blocks tree: {e}"))
                })
            })
            .collect()
    }

    fn block(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        let data = self
            .blocks
            .get(hash)
            .map_err(|e| BlockchainError::Database(format!("Failed to get block: {e}")))?;
        Ok(data.map(|v| v.to_vec()))
    }

    fn transaction(&self, id: &[u8]) -> Result<Option<Vec<u8>>> {
        let data = self
            .transactions
            .get(id)
            .map_err(|e| BlockchainError::Database(format!("Failed to get transaction: {e}")))?;
        Ok(data.map(|v| v.to_vec()))
    }
}
