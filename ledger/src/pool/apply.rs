//! Pool mutation: applying a transaction to the UTXO set.
//!
//! [`apply_transaction`] is the only function that turns a transaction into
//! a state change. It trusts its caller: validate first, or go through
//! [`SharedLedger::submit`](super::SharedLedger::submit), which does both.
//!
//! Steps:
//!
//! 1. Remove every referenced input. Inputs that are already gone are
//!    skipped.
//! 2. Insert one UTXO per output, id `{ tx.id, i }`, owned by the output's
//!    recipient.

use serde::{Deserialize, Serialize};

use super::utxo_set::UtxoSet;
use crate::transaction::{Transaction, Utxo, UtxoId};

/// What an application changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTransaction {
    pub tx_id: String,
    /// UTXOs actually removed, in input order.
    pub spent: Vec<Utxo>,
    /// Ids of the UTXOs created, in output order.
    pub created: Vec<UtxoId>,
}

impl AppliedTransaction {
    pub fn spent_total(&self) -> u128 {
        self.spent.iter().map(|u| u.amount as u128).sum()
    }
}

/// Consume `tx`'s inputs from `pool` and add its outputs.
///
/// Performs no validation and cannot fail. Applying an unvalidated
/// transaction can break supply conservation.
pub fn apply_transaction(tx: &Transaction, pool: &mut UtxoSet) -> AppliedTransaction {
    let spent: Vec<Utxo> = tx
        .utxo_refs()
        .filter_map(|utxo_ref| pool.remove_by_id(utxo_ref))
        .collect();

    let mut created = Vec::with_capacity(tx.outputs.len());
    for (index, output) in tx.outputs.iter().enumerate() {
        let id = UtxoId::new(tx.id.clone(), index as u32);
        pool.insert(Utxo::new(id.clone(), output.amount, output.recipient.clone()));
        created.push(id);
    }

    tracing::info!(
        tx_id = %tx.id,
        spent = spent.len(),
        created = created.len(),
        utxos = pool.len(),
        "transaction applied"
    );

    AppliedTransaction {
        tx_id: tx.id.clone(),
        spent,
        created,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519Service, SignatureService};
    use crate::transaction::{validate_transaction, TransactionBuilder, TransactionInput, TransactionOutput};

    #[test]
    fn spends_inputs_and_creates_outputs() {
        let service = Ed25519Service;
        let alice = service.generate_keypair();
        let bob = service.generate_keypair();
        let mut pool = UtxoSet::from_genesis([
            (alice.public_key.clone(), 1_000),
            (bob.public_key.clone(), 500),
        ]);

        let coin = pool.utxos_for_owner(&alice.public_key)[0].clone();
        let tx = TransactionBuilder::new()
            .input(&coin, &alice.private_key)
            .output(300, &bob.public_key)
            .output(700, &alice.public_key)
            .sign(&service)
            .unwrap();

        assert!(validate_transaction(&tx, &pool).valid);
        let applied = apply_transaction(&tx, &mut pool);

        assert_eq!(applied.spent, vec![coin.clone()]);
        assert_eq!(
            applied.created,
            vec![UtxoId::new(tx.id.clone(), 0), UtxoId::new(tx.id.clone(), 1)]
        );
        assert!(pool.get_by_id(&coin.id).is_none());
        assert_eq!(pool.balance(&alice.public_key), 700);
        assert_eq!(pool.balance(&bob.public_key), 800);
        assert_eq!(pool.total_supply(), 1_500);

        let change = pool.get(&tx.id, 1).unwrap();
        assert_eq!(change.owner, alice.public_key);
        assert_eq!(change.amount, 700);
    }

    #[test]
    fn missing_inputs_are_skipped() {
        let mut pool = UtxoSet::from_genesis([("alice", 10)]);
        let tx = Transaction {
            id: "t".to_string(),
            inputs: vec![TransactionInput {
                utxo_ref: UtxoId::new("x", 0),
                signature: String::new(),
            }],
            outputs: vec![TransactionOutput::new(5, "bob")],
            timestamp: 0,
        };

        let applied = apply_transaction(&tx, &mut pool);
        assert!(applied.spent.is_empty());
        assert_eq!(applied.spent_total(), 0);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.balance("alice"), 10);
        assert_eq!(pool.balance("bob"), 5);
    }

    #[test]
    fn spent_utxo_cannot_validate_again() {
        let service = Ed25519Service;
        let alice = service.generate_keypair();
        let mut pool = UtxoSet::from_genesis([(alice.public_key.clone(), 10)]);
        let coin = pool.utxos_for_owner(&alice.public_key)[0].clone();

        let tx = TransactionBuilder::new()
            .input(&coin, &alice.private_key)
            .output(10, &alice.public_key)
            .sign(&service)
            .unwrap();
        apply_transaction(&tx, &mut pool);

        let replay = TransactionBuilder::new()
            .input(&coin, &alice.private_key)
            .output(10, &alice.public_key)
            .sign(&service)
            .unwrap();
        let result = validate_transaction(&replay, &pool);
        assert!(!result.valid);
    }
}
