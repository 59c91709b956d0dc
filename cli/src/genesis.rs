//! Genesis allocation files.
//!
//! A genesis file is a JSON object whose keys are hex-encoded Ed25519 public
//! keys and whose values are amounts. Object order is allocation order, so
//! the first key receives `genesis:0`.
//!
//! ```json
//! {
//!   "3b6a27bc...": 1000,
//!   "9f1c0e2d...": 500
//! }
//! ```

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::path::Path;

use utxo_ledger::crypto::PublicKey;
use utxo_ledger::pool::UtxoSet;

/// Read and check a genesis file. Every key must be a valid public key.
pub fn load_allocations(path: &Path) -> Result<IndexMap<String, u64>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read genesis file {}", path.display()))?;
    let allocations: IndexMap<String, u64> = serde_json::from_str(&raw)
        .with_context(|| format!("genesis file {} is not a JSON object of amounts", path.display()))?;

    if allocations.is_empty() {
        bail!("genesis file {} has no allocations", path.display());
    }
    for owner in allocations.keys() {
        PublicKey::from_hex(owner)
            .with_context(|| format!("genesis owner {owner:?} is not a valid public key"))?;
    }

    Ok(allocations)
}

/// Load `path` and build the genesis UTXO set from it.
pub fn load_genesis(path: &Path) -> Result<UtxoSet> {
    let allocations = load_allocations(path)?;
    tracing::info!(path = %path.display(), owners = allocations.len(), "genesis file loaded");
    Ok(UtxoSet::from_genesis(allocations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use utxo_ledger::crypto::{Ed25519Service, SignatureService};

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_allocations_in_file_order() {
        let service = Ed25519Service;
        let a = service.generate_keypair().public_key;
        let b = service.generate_keypair().public_key;
        // Put the lexicographically larger key first to catch re-sorting.
        let (first, second) = if a > b { (a, b) } else { (b, a) };
        let file = write_temp(&format!(r#"{{"{first}": 1000, "{second}": 500}}"#));

        let set = load_genesis(file.path()).unwrap();
        assert_eq!(set.get("genesis", 0).unwrap().owner, first);
        assert_eq!(set.get("genesis", 1).unwrap().owner, second);
        assert_eq!(set.total_supply(), 1_500);
    }

    #[test]
    fn rejects_invalid_public_key() {
        let file = write_temp(r#"{"alice": 10}"#);
        let err = load_allocations(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("alice"));
    }

    #[test]
    fn rejects_negative_amount() {
        let key = Ed25519Service.generate_keypair().public_key;
        let file = write_temp(&format!(r#"{{"{key}": -5}}"#));
        assert!(load_allocations(file.path()).is_err());
    }

    #[test]
    fn rejects_empty_allocation() {
        let file = write_temp("{}");
        assert!(load_allocations(file.path()).is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_allocations(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}
