//! Error handling for the ledger
//!
//! Every failure the chain manager can surface is one of these variants. The
//! manager never retries or cleans up; callers decide what to show the user.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// An append was attempted before any genesis block was written
    NotInitialized,
    /// No persisted block is a genesis block
    GenesisNotFound,
    /// No block is stored under the requested hash
    BlockNotFound(String),
    /// No transaction is stored under the requested id
    TransactionNotFound(String),
    /// The transaction factory rejected its inputs
    Transaction(String),
    /// Store or read failure in the persistence layer
    Database(String),
    /// The last-block pointer moved between reading it and writing the new block
    TipMoved {
        expected: Option<String>,
        actual: Option<String>,
    },
    /// Serialization/deserialization errors
    Serialization(String),
    /// Block construction errors
    InvalidBlock(String),
    /// File I/O errors
    Io(String),
}

impl BlockchainError {
    /// Whether the failure came from the persistence layer (storage, codec or pointer race).
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            BlockchainError::Database(_)
                | BlockchainError::Serialization(_)
                | BlockchainError::TipMoved { .. }
        )
    }
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::NotInitialized => write!(
                f,
                "Blockchain not initialized: no last block found, create a blockchain first"
            ),
            BlockchainError::GenesisNotFound => write!(
                f,
                "No genesis block exists, please create a blockchain first"
            ),
            BlockchainError::BlockNotFound(hash) => write!(f, "Block not found: {hash}"),
            BlockchainError::TransactionNotFound(id) => write!(f, "Transaction not found: {id}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::Database(msg) => write!(f, "Database error: {msg}"),
            BlockchainError::TipMoved { expected, actual } => write!(
                f,
                "Last block moved during append: expected {}, found {}",
                expected.as_deref().unwrap_or("<none>"),
                actual.as_deref().unwrap_or("<none>")
            ),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}
