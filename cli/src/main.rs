// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # UTXO Ledger CLI
//!
//! Entry point for the `utxo-ledger` binary. Parses arguments, initializes
//! logging, and dispatches to a subcommand:
//!
//! - `demo`: three parties, two payments, one rejected replay
//! - `genesis`: load an allocation file and print the UTXO set
//! - `keygen`: print a fresh key pair
//! - `inspect`: decode a hex wire transaction
//! - `version`: print build information

mod cli;
mod genesis;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;

use utxo_ledger::codec::{decode_transaction, encode_transaction, encoding_efficiency};
use utxo_ledger::config::{ValidationConfig, SIGNING_ALGORITHM, SIGNING_DOMAIN_TAG};
use utxo_ledger::crypto::{Ed25519Service, KeyPair, SignatureService};
use utxo_ledger::pool::{SharedLedger, UtxoSet};
use utxo_ledger::transaction::{create_transaction, TransactionOutput, Validator};

use cli::{Commands, LedgerCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = LedgerCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Demo(args) => run_demo(args),
        Commands::Genesis(args) => show_genesis(args),
        Commands::Keygen => keygen(),
        Commands::Inspect(args) => inspect(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Alice pays Bob, Bob forwards part of it to Charlie, and a replay of the
/// first payment is turned away.
fn run_demo(args: cli::DemoArgs) -> Result<()> {
    let service = Ed25519Service;
    let alice = service.generate_keypair();
    let bob = service.generate_keypair();
    let charlie = service.generate_keypair();
    let parties: [(&str, &KeyPair); 3] = [("Alice", &alice), ("Bob", &bob), ("Charlie", &charlie)];

    let policy = if args.allow_zero_amounts {
        ValidationConfig::allow_zero_amounts()
    } else {
        ValidationConfig::strict()
    };
    let ledger = SharedLedger::with_validator(
        UtxoSet::from_genesis([
            (alice.public_key.clone(), 1_000),
            (bob.public_key.clone(), 500),
            (charlie.public_key.clone(), 250),
        ]),
        Validator::with_config(service, policy),
    );

    print_balances("Genesis", &ledger, &parties);

    // Alice -> Bob 300, 700 change.
    let alice_coin = ledger
        .utxos_for_owner(&alice.public_key)
        .into_iter()
        .next()
        .context("Alice has no genesis UTXO")?;
    let payment = create_transaction(
        &service,
        &[(&alice_coin, alice.private_key.as_str())],
        &[
            TransactionOutput::new(300, &bob.public_key),
            TransactionOutput::new(700, &alice.public_key),
        ],
    )
    .context("failed to build Alice -> Bob payment")?;
    let applied = ledger.submit(&payment)?;
    println!(
        "\nAlice -> Bob 300: tx {} spent {} UTXO(s), created {}",
        payment.id,
        applied.spent.len(),
        applied.created.len()
    );

    // Bob -> Charlie 150 out of the UTXO he just received, 150 change.
    let received = ledger
        .get(&payment.id, 0)
        .context("Bob's new UTXO is missing")?;
    let forward = create_transaction(
        &service,
        &[(&received, bob.private_key.as_str())],
        &[
            TransactionOutput::new(150, &charlie.public_key),
            TransactionOutput::new(150, &bob.public_key),
        ],
    )
    .context("failed to build Bob -> Charlie payment")?;
    let applied = ledger.submit(&forward)?;
    println!(
        "Bob -> Charlie 150: tx {} spent {} UTXO(s), created {}",
        forward.id,
        applied.spent.len(),
        applied.created.len()
    );

    match ledger.submit(&payment) {
        Ok(_) => bail!("replayed transaction {} was accepted", payment.id),
        Err(rejected) => {
            println!("Replay of {}: rejected", payment.id);
            for error in &rejected.result.errors {
                println!("  {}", error);
            }
        }
    }

    print_balances("Final", &ledger, &parties);

    let report = encoding_efficiency(&payment)?;
    println!(
        "\nWire size of first payment: {} bytes binary vs {} bytes JSON ({} smaller)",
        report.binary_size, report.json_size, report.savings
    );
    println!("Wire hex: {}", hex::encode(encode_transaction(&payment)?));
    println!("State root: {}", hex::encode(ledger.state_root()));

    Ok(())
}

fn print_balances(label: &str, ledger: &SharedLedger, parties: &[(&str, &KeyPair)]) {
    println!("\n{} balances:", label);
    for (name, keys) in parties {
        println!("  {:<8} {:>6}", name, ledger.balance(&keys.public_key));
    }
}

fn show_genesis(args: cli::GenesisArgs) -> Result<()> {
    let set = genesis::load_genesis(&args.path)?;

    for utxo in &set {
        println!("{:<12} {:>12}  {}", utxo.id.key(), utxo.amount, utxo.owner);
    }
    println!("\nUTXOs:        {}", set.len());
    println!("Total supply: {}", set.total_supply());
    println!("State root:   {}", hex::encode(set.state_root()));
    Ok(())
}

fn keygen() -> Result<()> {
    let keys = Ed25519Service.generate_keypair();
    let out = serde_json::json!({
        "algorithm": SIGNING_ALGORITHM,
        "public_key": keys.public_key,
        "private_key": keys.private_key,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    tracing::info!(public_key = %keys.public_key, "key pair generated");
    Ok(())
}

fn inspect(args: cli::InspectArgs) -> Result<()> {
    let bytes = hex::decode(args.hex.trim()).context("argument is not valid hex")?;
    let tx = decode_transaction(&bytes).context("failed to decode wire transaction")?;

    println!("{}", serde_json::to_string_pretty(&tx)?);

    let report = encoding_efficiency(&tx)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_version() {
    println!("utxo-ledger {}", env!("CARGO_PKG_VERSION"));
    println!("signing     {}", SIGNING_ALGORITHM);
    println!("domain tag  {}", String::from_utf8_lossy(SIGNING_DOMAIN_TAG));
}
