use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(s).map_err(|_| {
        format!("Invalid log level: {s}. Valid options: off, error, warn, info, debug, trace")
    })
}

#[derive(Debug, Parser)]
#[command(name = "ledger-chain")]
pub struct Opt {
    #[arg(
        long = "db",
        global = true,
        help = "Database directory (defaults to LEDGER_DB_PATH or ./data)"
    )]
    pub db: Option<PathBuf>,
    #[arg(
        long = "log-level",
        global = true,
        value_parser = parse_level,
        help = "Log level (defaults to LEDGER_LOG_LEVEL or info)"
    )]
    pub log_level: Option<LevelFilter>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "createblockchain", about = "Create a new blockchain")]
    Createblockchain {
        #[arg(help = "Recipient of the genesis coinbase transaction")]
        to: String,
    },
    #[command(name = "send", about = "Append a block with one transfer")]
    Send {
        #[arg(help = "Sender")]
        from: String,
        #[arg(help = "Recipient")]
        to: String,
        #[arg(help = "Amount to transfer", allow_negative_numbers = true)]
        amount: i64,
    },
    #[command(name = "printchain", about = "Print all blocks, newest first")]
    Printchain,
    #[command(name = "genesis", about = "Print the genesis block")]
    Genesis,
    #[command(name = "getblock", about = "Print one block by hash")]
    GetBlock {
        #[arg(help = "Block hash (hex)")]
        hash: String,
    },
    #[command(name = "gettransaction", about = "Print one transaction by id")]
    GetTransaction {
        #[arg(help = "Transaction id (hex)")]
        id: String,
    },
    #[command(name = "verifychain", about = "Check that stored blocks form one chain")]
    Verifychain,
}
