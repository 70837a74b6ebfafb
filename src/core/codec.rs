//! Byte and display encodings for blocks and transactions.
//!
//! The chain manager only talks to a [`BlockCodec`]; [`BincodeCodec`] is the
//! format written to disk.

use crate::core::{Block, Transaction};
use crate::error::Result;
use crate::utils::{deserialize, serialize};
use data_encoding::HEXLOWER;
use serde_json::{json, Map, Value};

pub trait BlockCodec {
    fn encode_block(&self, block: &Block) -> Result<Vec<u8>>;

    fn decode_block(&self, bytes: &[u8]) -> Result<Block>;

    fn encode_transaction(&self, transaction: &Transaction) -> Result<Vec<u8>>;

    fn decode_transaction(&self, bytes: &[u8]) -> Result<Transaction>;

    /// Presentation view of a block, with hashes and ids hex-encoded.
    fn block_map(&self, block: &Block) -> Map<String, Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl BlockCodec for BincodeCodec {
    fn encode_block(&self, block: &Block) -> Result<Vec<u8>> {
        block.serialize()
    }

    fn decode_block(&self, bytes: &[u8]) -> Result<Block> {
        Block::deserialize(bytes)
    }

    fn encode_transaction(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        serialize(transaction)
    }

    fn decode_transaction(&self, bytes: &[u8]) -> Result<Transaction> {
        deserialize::<Transaction>(bytes)
    }

    fn block_map(&self, block: &Block) -> Map<String, Value> {
        let transactions: Vec<Value> = block
            .get_transactions()
            .iter()
            .map(|tx| Value::Object(transaction_map(tx)))
            .collect();

        let mut map = Map::new();
        map.insert("hash".to_string(), json!(block.get_hash()));
        map.insert(
            "prevHash".to_string(),
            json!(block.get_prev_hash().unwrap_or_default()),
        );
        map.insert("timestamp".to_string(), json!(block.get_timestamp()));
        map.insert("height".to_string(), json!(block.get_height()));
        map.insert("transactions".to_string(), Value::Array(transactions));
        map
    }
}

pub fn transaction_map(tx: &Transaction) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("id".to_string(), json!(HEXLOWER.encode(tx.get_id())));
    map.insert("from".to_string(), json!(tx.get_from()));
    map.insert("to".to_string(), json!(tx.get_to()));
    map.insert("amount".to_string(), json!(tx.get_amount()));
    map.insert("memo".to_string(), json!(tx.get_memo()));
    map
}
