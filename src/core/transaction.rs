// Value-transfer records. A block owns its transactions; the coinbase one only
// ever appears in the genesis block and has no sender.

use crate::error::{BlockchainError, Result};
use crate::utils::sha256_digest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    id: Vec<u8>,    // sha256 over every other field
    from: String,   // empty for coinbase
    to: String,
    amount: u64,    // always 0 for coinbase
    memo: String,
    nonce: Vec<u8>, // random bytes so identical transfers still get distinct ids
}

impl Transaction {
    pub fn new_coinbase_tx(to: &str, memo: &str) -> Transaction {
        Self::build(String::new(), to.to_string(), 0, memo.to_string())
    }

    pub fn new_transfer(from: &str, to: &str, amount: i64) -> Result<Transaction> {
        if from.is_empty() {
            return Err(BlockchainError::Transaction(
                "Sender must not be empty".to_string(),
            ));
        }
        if to.is_empty() {
            return Err(BlockchainError::Transaction(
                "Recipient must not be empty".to_string(),
            ));
        }
        let amount = u64::try_from(amount).map_err(|_| {
            BlockchainError::Transaction(format!("Amount must not be negative: {amount}"))
        })?;

        Ok(Self::build(
            from.to_string(),
            to.to_string(),
            amount,
            String::new(),
        ))
    }

    fn build(from: String, to: String, amount: u64, memo: String) -> Transaction {
        let mut tx = Transaction {
            id: vec![],
            from,
            to,
            amount,
            memo,
            nonce: Uuid::new_v4().as_bytes().to_vec(),
        };
        tx.id = tx.hash();
        tx
    }

    // Length-prefixed so that ("ab", "c") and ("a", "bc") never hash alike
    fn prepare_data(&self) -> Vec<u8> {
        let mut data = vec![];
        for field in [
            self.from.as_bytes(),
            self.to.as_bytes(),
            self.memo.as_bytes(),
            self.nonce.as_slice(),
        ] {
            data.extend((field.len() as u64).to_be_bytes());
            data.extend(field);
        }
        data.extend(self.amount.to_be_bytes());
        data
    }

    pub fn hash(&self) -> Vec<u8> {
        sha256_digest(self.prepare_data().as_slice())
    }

    /// True when the stored id matches the transaction's contents.
    pub fn verify_id(&self) -> bool {
        self.id == self.hash()
    }

    pub fn is_coinbase(&self) -> bool {
        self.from.is_empty()
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_from(&self) -> &str {
        self.from.as_str()
    }

    pub fn get_to(&self) -> &str {
        self.to.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_memo(&self) -> &str {
        self.memo.as_str()
    }
}

/// Builds the transactions the chain manager puts into blocks.
pub trait TransactionFactory {
    /// Chain-initiating record paying `to`, carrying `memo`.
    fn coinbase(&self, to: &str, memo: &str) -> Transaction;

    /// Regular transfer. Errors are reported as `BlockchainError::Transaction`.
    fn transfer(&self, from: &str, to: &str, amount: i64) -> Result<Transaction>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTransactionFactory;

impl TransactionFactory for StandardTransactionFactory {
    fn coinbase(&self, to: &str, memo: &str) -> Transaction {
        Transaction::new_coinbase_tx(to, memo)
    }

    fn transfer(&self, from: &str, to: &str, amount: i64) -> Result<Transaction> {
        Transaction::new_transfer(from, to, amount)
    }
}
