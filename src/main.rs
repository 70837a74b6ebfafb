// Entry point for the ledger CLI: parse arguments, open the sled database and
// hand the command to the chain manager.
use clap::Parser;
use ledger_chain::{
    transaction_map, BlockCodec, ChainManager, Command, Opt, SledStore, GLOBAL_CONFIG,
};
use log::error;
use serde_json::{json, Value};
use std::process;

fn main() {
    let opt = Opt::parse();
    if let Some(level) = opt.log_level {
        GLOBAL_CONFIG.set_log_level(level);
    }
    if let Some(db) = opt.db {
        GLOBAL_CONFIG.set_db_path(db);
    }

    env_logger::builder()
        .filter_level(GLOBAL_CONFIG.get_log_level())
        .init();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let store = SledStore::open(GLOBAL_CONFIG.get_db_path())?;
    let manager = ChainManager::new(store);
    let codec = manager.codec();

    match command {
        Command::Createblockchain { to } => {
            let (genesis, already_existed) = manager.create_blockchain(&to)?;
            if already_existed {
                print_json(&json!({ "message": "Blockchain already exists." }))?;
            } else {
                print_json(&json!({
                    "data": codec.block_map(&genesis),
                    "message": "Blockchain created.",
                }))?;
            }
        }
        Command::Send { from, to, amount } => {
            let block = manager.add_to_blockchain(&from, &to, amount)?;
            print_json(&json!({ "data": codec.block_map(&block) }))?;
        }
        Command::Printchain => {
            let data: Vec<Value> = manager
                .get_blockchain()?
                .iter()
                .map(|block| Value::Object(codec.block_map(block)))
                .collect();
            print_json(&json!({ "data": data }))?;
        }
        Command::Genesis => {
            let genesis = manager.get_genesis_block()?;
            print_json(&json!({ "data": codec.block_map(&genesis) }))?;
        }
        Command::GetBlock { hash } => {
            let block = manager.get_block(&hash)?;
            print_json(&json!({ "data": codec.block_map(&block) }))?;
        }
        Command::GetTransaction { id } => {
            let transaction = manager.get_transaction(&id)?;
            print_json(&json!({ "data": transaction_map(&transaction) }))?;
        }
        Command::Verifychain => {
            let length = manager.verify_chain()?;
            print_json(&json!({ "message": format!("Chain is valid with {length} blocks.") }))?;
        }
    }

    manager.store().flush()?;
    Ok(())
}
