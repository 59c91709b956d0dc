//! # CLI Interface
//!
//! Command-line structure for `utxo-ledger`, built with `clap` derive.
//! Subcommands: `demo`, `genesis`, `keygen`, `inspect`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Single-node UTXO ledger.
///
/// Builds, signs, validates, and applies transactions against an in-memory
/// UTXO set, and decodes transactions in the binary wire format.
#[derive(Parser, Debug)]
#[command(
    name = "utxo-ledger",
    about = "Single-node UTXO ledger",
    version,
    propagate_version = true
)]
pub struct LedgerCli {
    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "LEDGER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Log level for the ledger's own events when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the three-party payment walkthrough.
    Demo(DemoArgs),
    /// Load a genesis allocation file and print the resulting UTXO set.
    Genesis(GenesisArgs),
    /// Generate a fresh Ed25519 key pair.
    Keygen,
    /// Decode a hex-encoded wire transaction and print it as JSON.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Accept zero-amount outputs instead of rejecting them.
    #[arg(long)]
    pub allow_zero_amounts: bool,
}

#[derive(Parser, Debug)]
pub struct GenesisArgs {
    /// JSON object mapping hex public keys to amounts, in allocation order.
    #[arg(env = "LEDGER_GENESIS")]
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Wire-format transaction bytes, hex-encoded.
    pub hex: String,
}
