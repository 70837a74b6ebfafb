//! # Ledger Chain - an append-only ledger of hash-linked blocks
//!
//! Each block carries one or more value transfers and points at the block
//! before it by hash. Everything durable lives in a key-value store; the chain
//! manager rebuilds chain order from the stored blocks on every read.
//!
//! ## How the code is organized
//! - `core/`: blocks, transactions, their factories and codec, and the
//!   [`ChainManager`] that creates the genesis block, appends, lists the chain
//!   and finds genesis
//! - `storage/`: the [`ChainStore`] boundary with sled and in-memory backends
//! - `config/`: database path and log level
//! - `utils/`: hashing, timestamps and bincode helpers
//! - `cli/`: command-line parsing for the `ledger-chain` binary
//!
//! ## Invariants worth remembering
//! - Exactly one stored block is [`BlockLink::Genesis`]; every other block links
//!   to a block that was stored before it.
//! - Appends are serialized in-process and the store only moves the last-block
//!   pointer if it still names the block the append was built on.
//! - No mining, no consensus, no balance checks, no signatures.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testnet;

pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use self::core::{
    transaction_map, BincodeCodec, Block, BlockCodec, BlockFactory, BlockLink, ChainManager,
    StandardBlockFactory, StandardTransactionFactory, Transaction, TransactionFactory,
    GENESIS_COINBASE_MEMO,
};
pub use error::{BlockchainError, Result};
pub use storage::{ChainStore, MemoryStore, SledStore};
pub use utils::{current_timestamp, sha256_digest};
