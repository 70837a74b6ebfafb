use crate::core::Transaction;
use crate::error::{BlockchainError, Result};
use crate::utils::{current_timestamp, deserialize, serialize, sha256_digest};
use data_encoding::HEXLOWER;
use log::debug;
use serde::{Deserialize, Serialize};

/// How a block attaches to the chain. Only the genesis block has no parent.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub enum BlockLink {
    Genesis,
    Linked { prev_hash: String },
}

impl BlockLink {
    pub fn prev_hash(&self) -> Option<&str> {
        match self {
            BlockLink::Genesis => None,
            BlockLink::Linked { prev_hash } => Some(prev_hash.as_str()),
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Block {
    timestamp: i64, // milliseconds since the Unix epoch
    link: BlockLink,
    hash: String,
    height: u64, // 0 for genesis, parent + 1 otherwise
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn new_block(
        link: BlockLink,
        transactions: Vec<Transaction>,
        height: u64,
        timestamp: i64,
    ) -> Result<Block> {
        if transactions.is_empty() {
            return Err(BlockchainError::InvalidBlock(
                "Block must contain at least one transaction".to_string(),
            ));
        }
        if matches!(link, BlockLink::Genesis) != (height == 0) {
            return Err(BlockchainError::InvalidBlock(format!(
                "Height {height} does not match block link {link:?}"
            )));
        }

        let mut block = Block {
            timestamp,
            link,
            hash: String::new(),
            height,
            transactions,
        };
        block.hash = block.compute_hash();
        debug!("Built block {} at height {height}", block.hash);

        Ok(block)
    }

    fn prepare_data(&self) -> Vec<u8> {
        let mut data_bytes = vec![];
        match &self.link {
            BlockLink::Genesis => data_bytes.push(0u8),
            BlockLink::Linked { prev_hash } => {
                data_bytes.push(1u8);
                data_bytes.extend(prev_hash.as_bytes());
            }
        }
        data_bytes.extend(self.timestamp.to_be_bytes());
        data_bytes.extend(self.height.to_be_bytes());
        for tx in &self.transactions {
            data_bytes.extend(tx.get_id());
        }
        data_bytes
    }

    pub fn compute_hash(&self) -> String {
        HEXLOWER.encode(sha256_digest(self.prepare_data().as_slice()).as_slice())
    }

    /// Recomputes the hash and checks every transaction id against its contents.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash() && self.transactions.iter().all(|tx| tx.verify_id())
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self.link, BlockLink::Genesis)
    }

    pub fn get_prev_hash(&self) -> Option<&str> {
        self.link.prev_hash()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_height(&self) -> u64 {
        self.height
    }
}

/// Builds blocks on top of an optional parent, computing hash and timestamp.
pub trait BlockFactory {
    /// `parent` is `None` for the genesis block.
    fn make_block(&self, transactions: Vec<Transaction>, parent: Option<&Block>) -> Result<Block>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBlockFactory;

impl BlockFactory for StandardBlockFactory {
    fn make_block(&self, transactions: Vec<Transaction>, parent: Option<&Block>) -> Result<Block> {
        let now = current_timestamp()?;
        match parent {
            None => Block::new_block(BlockLink::Genesis, transactions, 0, now),
            // Never earlier than the parent, even if the clock stepped back
            Some(parent) => Block::new_block(
                BlockLink::Linked {
                    prev_hash: parent.get_hash().to_string(),
                },
                transactions,
                parent.get_height() + 1,
                now.max(parent.get_timestamp()),
            ),
        }
    }
}
