// The chain manager. It holds no chain state of its own: every call reads the
// store, works out what to do, and writes back. Ordering and genesis lookup are
// recomputed from the stored blocks each time.

use crate::core::{
    BincodeCodec, Block, BlockCodec, BlockFactory, StandardBlockFactory,
    StandardTransactionFactory, Transaction, TransactionFactory,
};
use crate::error::{BlockchainError, Result};
use crate::storage::ChainStore;
use data_encoding::HEXLOWER;
use log::{error, info};
use std::collections::HashMap;
use std::sync::Mutex;

/// Memo carried by the coinbase transaction of every genesis block.
pub const GENESIS_COINBASE_MEMO: &str = "First transaction in Blockchain";

pub struct ChainManager<
    S,
    C = BincodeCodec,
    T = StandardTransactionFactory,
    B = StandardBlockFactory,
> {
    store: S,
    codec: C,
    transactions: T,
    blocks: B,
    // Serializes read-last-block -> build -> write within this process. The
    // store's compare-and-swap covers writers in other processes.
    write_lock: Mutex<()>,
}

impl<S: ChainStore> ChainManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_collaborators(
            store,
            BincodeCodec,
            StandardTransactionFactory,
            StandardBlockFactory,
        )
    }
}

impl<S, C, T, B> ChainManager<S, C, T, B>
where
    S: ChainStore,
    C: BlockCodec,
    T: TransactionFactory,
    B: BlockFactory,
{
    pub fn with_collaborators(store: S, codec: C, transactions: T, blocks: B) -> Self {
        ChainManager {
            store,
            codec,
            transactions,
            blocks,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn lock_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| BlockchainError::Database("Chain write lock is poisoned".to_string()))
    }

    /// Returns the genesis block and whether it was already there.
    ///
    /// When a genesis block exists the flag is `genesis.is_genesis()`, which is
    /// always true for anything the lookup returns.
    pub fn create_blockchain(&self, to: &str) -> Result<(Block, bool)> {
        let _guard = self.lock_writes()?;

        let genesis = match self.get_genesis_block() {
            Ok(genesis) => genesis,
            Err(BlockchainError::GenesisNotFound) => {
                info!("No genesis block found, creating blockchain for {to}");
                return self.write_genesis(to).map(|block| (block, false));
            }
            Err(e) => {
                error!("Error getting genesis block: {e}");
                return Err(e);
            }
        };

        let already_existed = genesis.is_genesis();
        Ok((genesis, already_existed))
    }

    fn write_genesis(&self, to: &str) -> Result<Block> {
        let coinbase_tx = self.transactions.coinbase(to, GENESIS_COINBASE_MEMO);
        let block = self.blocks.make_block(vec![coinbase_tx.clone()], None)?;
        let block_bytes = self.codec.encode_block(&block)?;
        let decoded = self.codec.decode_block(&block_bytes)?;

        // The block write is the commit point: a coinbase stored without its
        // block is never reachable, a block without its coinbase would be.
        self.persist_transaction(&coinbase_tx)?;
        self.store
            .store_block(block.get_hash(), &block_bytes, None)
            .inspect_err(|e| error!("Error creating blockchain: {e}"))?;

        info!("Created genesis block {}", block.get_hash());
        Ok(decoded)
    }

    /// Appends a block holding a single transfer on top of the last block.
    ///
    /// The block is written before the transaction; if the transaction write
    /// fails the block stays, since it embeds the transaction anyway.
    pub fn add_to_blockchain(&self, from: &str, to: &str, amount: i64) -> Result<Block> {
        let _guard = self.lock_writes()?;

        let last_block_bytes = self.store.last_block().inspect_err(|e| {
            error!("Error getting last block, blockchain probably has not been created: {e}")
        })?;
        let last_block = self.codec.decode_block(&last_block_bytes)?;

        let transaction = self.transactions.transfer(from, to, amount)?;
        let block = self
            .blocks
            .make_block(vec![transaction.clone()], Some(&last_block))?;

        let block_bytes = self.codec.encode_block(&block)?;
        self.store
            .store_block(block.get_hash(), &block_bytes, Some(last_block.get_hash()))
            .inspect_err(|e| error!("Error saving block to db: {e}"))?;
        self.persist_transaction(&transaction)?;

        info!(
            "Appended block {} at height {} ({from} -> {to}: {amount})",
            block.get_hash(),
            block.get_height()
        );
        Ok(block)
    }

    fn persist_transaction(&self, transaction: &Transaction) -> Result<()> {
        let bytes = self.codec.encode_transaction(transaction)?;
        self.store
            .store_transaction(transaction.get_id(), &bytes)
            .inspect_err(|e| error!("Error saving transaction to db: {e}"))
    }

    fn load_blocks(&self) -> Result<Vec<Block>> {
        let raw = self
            .store
            .blocks()
            .inspect_err(|e| error!("Error getting all blocks in blockchain: {e}"))?;
        raw.iter()
            .map(|bytes| self.codec.decode_block(bytes))
            .collect()
    }

    /// Every stored block, newest first, genesis last.
    ///
    /// Sorted by timestamp descending. Blocks sharing a timestamp fall back to
    /// height descending, so a single linear chain always has a total order.
    pub fn get_blockchain(&self) -> Result<Vec<Block>> {
        let mut blocks = self.load_blocks()?;
        blocks.sort_by(|a, b| {
            b.get_timestamp()
                .cmp(&a.get_timestamp())
                .then_with(|| b.get_height().cmp(&a.get_height()))
        });
        Ok(blocks)
    }

    pub fn get_genesis_block(&self) -> Result<Block> {
        self.load_blocks()?
            .into_iter()
            .find(Block::is_genesis)
            .ok_or(BlockchainError::GenesisNotFound)
    }

    pub fn get_block(&self, hash: &str) -> Result<Block> {
        info!("Getting block with hash: {hash}");
        match self.store.block(hash)? {
            Some(bytes) => self.codec.decode_block(&bytes),
            None => Err(BlockchainError::BlockNotFound(hash.to_string())),
        }
    }

    /// Looks a transaction up by its hex-encoded id.
    pub fn get_transaction(&self, id_hex: &str) -> Result<Transaction> {
        let id = HEXLOWER
            .decode(id_hex.to_ascii_lowercase().as_bytes())
            .map_err(|_| BlockchainError::TransactionNotFound(id_hex.to_string()))?;
        match self.store.transaction(&id)? {
            Some(bytes) => self.codec.decode_transaction(&bytes),
            None => Err(BlockchainError::TransactionNotFound(id_hex.to_string())),
        }
    }

    /// Walks from the last block back to genesis and checks that the stored
    /// blocks form exactly one unbroken chain. Returns the chain length.
    pub fn verify_chain(&self) -> Result<usize> {
        let blocks = self.load_blocks()?;
        let genesis_count = blocks.iter().filter(|b| b.is_genesis()).count();
        match genesis_count {
            0 => return Err(BlockchainError::GenesisNotFound),
            1 => {}
            n => {
                return Err(BlockchainError::InvalidBlock(format!(
                    "Found {n} genesis blocks"
                )))
            }
        }

        let by_hash: HashMap<&str, &Block> = blocks.iter().map(|b| (b.get_hash(), b)).collect();
        let mut current = self.codec.decode_block(&self.store.last_block()?)?;
        let mut walked = 1;

        loop {
            if !current.verify() {
                return Err(BlockchainError::InvalidBlock(format!(
                    "Block {} does not match its contents",
                    current.get_hash()
                )));
            }
            let prev_hash = match current.get_prev_hash() {
                None => break,
                Some(prev_hash) => prev_hash,
            };
            let parent = by_hash.get(prev_hash).ok_or_else(|| {
                BlockchainError::InvalidBlock(format!(
                    "Block {} links to unknown block {prev_hash}",
                    current.get_hash()
                ))
            })?;
            if parent.get_height() + 1 != current.get_height()
                || parent.get_timestamp() > current.get_timestamp()
            {
                return Err(BlockchainError::InvalidBlock(format!(
                    "Block {} is out of order with its parent",
                    current.get_hash()
                )));
            }
            current = (*parent).clone();
            walked += 1;
        }

        if walked != blocks.len() {
            return Err(BlockchainError::InvalidBlock(format!(
                "{} stored blocks are not reachable from the last block",
                blocks.len() - walked
            )));
        }
        Ok(walked)
    }
}
