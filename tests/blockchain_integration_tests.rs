//! Chain manager integration tests
//!
//! Runs the public API against real sled databases in temporary directories.

use data_encoding::HEXLOWER;
use ledger_chain::{
    BlockFactory, BlockchainError, ChainManager, ChainStore, SledStore, StandardBlockFactory,
    Transaction, GENESIS_COINBASE_MEMO,
};
use std::path::Path;
use tempfile::tempdir;

fn open_manager(path: &Path) -> ChainManager<SledStore> {
    ChainManager::new(SledStore::open(path).unwrap())
}

#[test]
fn test_alice_bob_scenario() {
    let temp_dir = tempdir().unwrap();
    let manager = open_manager(&temp_dir.path().join("chain"));

    let (genesis, already_existed) = manager.create_blockchain("alice").unwrap();
    assert!(!already_existed);
    assert!(genesis.is_genesis());
    let coinbase = &genesis.get_transactions()[0];
    assert!(coinbase.is_coinbase());
    assert_eq!(coinbase.get_to(), "alice");
    assert_eq!(coinbase.get_memo(), GENESIS_COINBASE_MEMO);

    let block2 = manager.add_to_blockchain("alice", "bob", 10).unwrap();
    assert_eq!(block2.get_prev_hash(), Some(genesis.get_hash()));
    assert_eq!(block2.get_transactions().len(), 1);
    let transfer = &block2.get_transactions()[0];
    assert_eq!(transfer.get_from(), "alice");
    assert_eq!(transfer.get_to(), "bob");
    assert_eq!(transfer.get_amount(), 10);

    let chain = manager.get_blockchain().unwrap();
    assert_eq!(chain, vec![block2, genesis.clone()]);

    assert_eq!(manager.get_genesis_block().unwrap(), genesis);
}

#[test]
fn test_genesis_is_unique_across_creates() {
    let temp_dir = tempdir().unwrap();
    let manager = open_manager(&temp_dir.path().join("chain"));

    let (first, _) = manager.create_blockchain("alice").unwrap();
    for name in ["alice", "bob", "carol"] {
        let (again, already_existed) = manager.create_blockchain(name).unwrap();
        assert!(already_existed);
        assert_eq!(again, first);
    }

    let genesis_blocks = manager
        .get_blockchain()
        .unwrap()
        .into_iter()
        .filter(|b| b.is_genesis())
        .count();
    assert_eq!(genesis_blocks, 1);
}

#[test]
fn test_uninitialized_append_persists_nothing() {
    let temp_dir = tempdir().unwrap();
    let manager = open_manager(&temp_dir.path().join("chain"));

    let result = manager.add_to_blockchain("alice", "bob", 10);
    assert_eq!(result, Err(BlockchainError::NotInitialized));
    assert!(manager.store().blocks().unwrap().is_empty());
    assert_eq!(manager.store().last_block_hash().unwrap(), None);
}

#[test]
fn test_every_append_links_to_previous_last_block() {
    let temp_dir = tempdir().unwrap();
    let manager = open_manager(&temp_dir.path().join("chain"));
    manager.create_blockchain("alice").unwrap();

    for amount in 1..=10 {
        let before = manager.store().last_block_hash().unwrap().unwrap();
        let block = manager.add_to_blockchain("alice", "bob", amount).unwrap();
        assert_eq!(block.get_prev_hash(), Some(before.as_str()));
    }

    let chain = manager.get_blockchain().unwrap();
    assert_eq!(chain.len(), 11);
    assert!(chain.last().unwrap().is_genesis());
    for pair in chain.windows(2) {
        assert!(pair[0].get_timestamp() >= pair[1].get_timestamp());
        assert_eq!(pair[0].get_prev_hash(), Some(pair[1].get_hash()));
    }
    assert_eq!(manager.verify_chain().unwrap(), 11);
}

#[test]
fn test_chain_survives_reopen() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("chain");

    let (genesis, last) = {
        let manager = open_manager(&path);
        let (genesis, _) = manager.create_blockchain("alice").unwrap();
        let last = manager.add_to_blockchain("alice", "bob", 5).unwrap();
        manager.store().flush().unwrap();
        (genesis, last)
    };

    let manager = open_manager(&path);
    assert_eq!(manager.get_genesis_block().unwrap(), genesis);
    let next = manager.add_to_blockchain("bob", "carol", 2).unwrap();
    assert_eq!(next.get_prev_hash(), Some(last.get_hash()));
    assert_eq!(manager.get_blockchain().unwrap().len(), 3);
}

#[test]
fn test_concurrent_appends_stay_linear() {
    let temp_dir = tempdir().unwrap();
    let manager = open_manager(&temp_dir.path().join("chain"));
    manager.create_blockchain("alice").unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let manager = &manager;
            scope.spawn(move || {
                for i in 0..5 {
                    manager
                        .add_to_blockchain("alice", &format!("worker-{worker}"), i)
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(manager.verify_chain().unwrap(), 21);
}

#[test]
fn test_two_handles_cannot_fork_the_chain() {
    let store = SledStore::open_temporary().unwrap();
    let first = ChainManager::new(store.clone());
    let second = ChainManager::new(store.clone());
    let (genesis, _) = first.create_blockchain("alice").unwrap();

    // A writer that read the old last block loses the compare-and-swap
    let stale_last = genesis.get_hash().to_string();
    first.add_to_blockchain("alice", "bob", 1).unwrap();
    let tx = Transaction::new_transfer("alice", "mallory", 1).unwrap();
    let block = StandardBlockFactory
        .make_block(vec![tx], Some(&genesis))
        .unwrap();
    let result = store.store_block(
        block.get_hash(),
        &block.serialize().unwrap(),
        Some(stale_last.as_str()),
    );
    assert!(matches!(result, Err(BlockchainError::TipMoved { .. })));

    second.add_to_blockchain("bob", "carol", 1).unwrap();
    assert_eq!(first.verify_chain().unwrap(), 3);
}

#[test]
fn test_lookup_block_and_transaction() {
    let temp_dir = tempdir().unwrap();
    let manager = open_manager(&temp_dir.path().join("chain"));
    manager.create_blockchain("alice").unwrap();
    let block = manager.add_to_blockchain("alice", "bob", 7).unwrap();

    assert_eq!(manager.get_block(block.get_hash()).unwrap(), block);

    let tx = &block.get_transactions()[0];
    let id_hex = HEXLOWER.encode(tx.get_id());
    assert_eq!(&manager.get_transaction(&id_hex).unwrap(), tx);
    assert!(matches!(
        manager.get_transaction("00ff"),
        Err(BlockchainError::TransactionNotFound(_))
    ));
}
