//! Core ledger functionality
//!
//! Blocks, transactions, their factories and codec, and the chain manager that
//! ties them to a [`crate::storage::ChainStore`].

pub mod block;
pub mod blockchain;
pub mod codec;
pub mod transaction;

pub use block::{Block, BlockFactory, BlockLink, StandardBlockFactory};
pub use blockchain::{ChainManager, GENESIS_COINBASE_MEMO};
pub use codec::{transaction_map, BincodeCodec, BlockCodec};
pub use transaction::{StandardTransactionFactory, Transaction, TransactionFactory};
