//! # UTXO Set
//!
//! The authoritative store of every spendable output, keyed by [`UtxoId`].
//!
//! Backed by an [`IndexMap`], so iteration and owner queries return UTXOs in
//! insertion order. Removal uses `shift_remove`, which keeps the relative
//! order of the entries that remain. Lookups stay O(1); owner queries and
//! balances are a linear scan, which is fine at single-node scale.
//!
//! ## State Root
//!
//! [`UtxoSet::state_root`] commits to the full contents:
//!
//! ```text
//! leaves = [ BLAKE3(tx_id_len || tx_id || index || amount || owner_len || owner)
//!            for utxo in sort_by_id(set) ]
//! root   = pairwise BLAKE3 reduction of leaves (odd leaf paired with itself)
//! ```
//!
//! Sorting makes the root independent of insertion order, so two sets with
//! the same UTXOs always agree.

use indexmap::IndexMap;

use crate::config::{GENESIS_TX_ID, STATE_ROOT_LENGTH};
use crate::transaction::{Utxo, UtxoId};

// ---------------------------------------------------------------------------
// UtxoView
// ---------------------------------------------------------------------------

/// Read-only access to UTXOs by id.
///
/// This is all the validator needs from the ledger. Taking a view instead of
/// a concrete set lets the validator run against a locked guard, a snapshot,
/// or a test double with the same code.
pub trait UtxoView {
    fn get_utxo(&self, id: &UtxoId) -> Option<&Utxo>;
}

// ---------------------------------------------------------------------------
// UtxoSet
// ---------------------------------------------------------------------------

/// In-memory UTXO set.
///
/// Invariant: every entry's key equals its UTXO's `id`. Only [`insert`] and
/// [`remove`] write, and `insert` derives the key from the record.
///
/// [`insert`]: UtxoSet::insert
/// [`remove`]: UtxoSet::remove
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSet {
    utxos: IndexMap<UtxoId, Utxo>,
}

impl UtxoSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the initial set from an ordered allocation of owner to amount.
    ///
    /// Each entry becomes one UTXO with tx id [`GENESIS_TX_ID`] and output
    /// index equal to its position in the allocation.
    pub fn from_genesis<I, K>(allocations: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut set = Self::new();
        for (index, (owner, amount)) in allocations.into_iter().enumerate() {
            set.insert(Utxo::new(
                UtxoId::new(GENESIS_TX_ID, index as u32),
                amount,
                owner,
            ));
        }

        tracing::info!(
            utxos = set.len(),
            total_supply = %set.total_supply(),
            "genesis UTXO set created"
        );
        set
    }

    /// Look up the UTXO created by output `output_index` of `tx_id`.
    pub fn get(&self, tx_id: &str, output_index: u32) -> Option<&Utxo> {
        self.utxos.get(&UtxoId::new(tx_id, output_index))
    }

    /// Look up by id.
    pub fn get_by_id(&self, id: &UtxoId) -> Option<&Utxo> {
        self.utxos.get(id)
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// Add `utxo` under its own id, replacing any existing entry.
    pub fn insert(&mut self, utxo: Utxo) {
        self.utxos.insert(utxo.id.clone(), utxo);
    }

    /// Remove and return the UTXO at (`tx_id`, `output_index`).
    ///
    /// Removing an absent key is a no-op that returns `None`.
    pub fn remove(&mut self, tx_id: &str, output_index: u32) -> Option<Utxo> {
        self.remove_by_id(&UtxoId::new(tx_id, output_index))
    }

    pub fn remove_by_id(&mut self, id: &UtxoId) -> Option<Utxo> {
        self.utxos.shift_remove(id)
    }

    /// All UTXOs owned by `public_key`, in insertion order.
    pub fn utxos_for_owner(&self, public_key: &str) -> Vec<Utxo> {
        self.owned_by(public_key).cloned().collect()
    }

    /// Sum of the amounts owned by `public_key`. Zero for unknown owners.
    pub fn balance(&self, public_key: &str) -> u128 {
        self.owned_by(public_key).map(|u| u.amount as u128).sum()
    }

    fn owned_by<'a>(&'a self, public_key: &'a str) -> impl Iterator<Item = &'a Utxo> + 'a {
        self.utxos.values().filter(move |u| u.owner == public_key)
    }

    /// Independent copy. Later changes to either side never show in the
    /// other.
    pub fn clone_snapshot(&self) -> Self {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// All UTXOs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.values()
    }

    /// Sum of every amount in the set.
    pub fn total_supply(&self) -> u128 {
        self.utxos.values().map(|u| u.amount as u128).sum()
    }

    /// BLAKE3 commitment over the sorted contents. All zeros when empty.
    pub fn state_root(&self) -> [u8; STATE_ROOT_LENGTH] {
        if self.utxos.is_empty() {
            return [0u8; STATE_ROOT_LENGTH];
        }

        let mut sorted: Vec<&Utxo> = self.utxos.values().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut level: Vec<[u8; 32]> = sorted.into_iter().map(leaf_hash).collect();

        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| {
                    let right = pair.get(1).unwrap_or(&pair[0]);
                    let mut hasher = blake3::Hasher::new();
                    hasher.update(&pair[0]);
                    hasher.update(right);
                    *hasher.finalize().as_bytes()
                })
                .collect();
        }

        level[0]
    }
}

fn leaf_hash(utxo: &Utxo) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(utxo.id.tx_id.len() as u32).to_le_bytes());
    hasher.update(utxo.id.tx_id.as_bytes());
    hasher.update(&utxo.id.output_index.to_le_bytes());
    hasher.update(&utxo.amount.to_le_bytes());
    hasher.update(&(utxo.owner.len() as u32).to_le_bytes());
    hasher.update(utxo.owner.as_bytes());
    *hasher.finalize().as_bytes()
}

impl UtxoView for UtxoSet {
    fn get_utxo(&self, id: &UtxoId) -> Option<&Utxo> {
        self.get_by_id(id)
    }
}

impl<'a> IntoIterator for &'a UtxoSet {
    type Item = &'a Utxo;
    type IntoIter = indexmap::map::Values<'a, UtxoId, Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.values()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(tx: &str, index: u32, amount: u64, owner: &str) -> Utxo {
        Utxo::new(UtxoId::new(tx, index), amount, owner)
    }

    #[test]
    fn genesis_assigns_sequential_indices() {
        let set = UtxoSet::from_genesis([("alice", 1_000), ("bob", 500), ("charlie", 250)]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get("genesis", 0).unwrap().owner, "alice");
        assert_eq!(set.get("genesis", 1).unwrap().owner, "bob");
        assert_eq!(set.get("genesis", 2).unwrap().amount, 250);
        assert_eq!(set.total_supply(), 1_750);
    }

    #[test]
    fn empty_genesis_is_empty_set() {
        let set = UtxoSet::from_genesis(Vec::<(String, u64)>::new());
        assert!(set.is_empty());
        assert_eq!(set.total_supply(), 0);
    }

    #[test]
    fn key_always_matches_record_id() {
        let mut set = UtxoSet::new();
        set.insert(utxo("tx", 4, 10, "alice"));
        let id = UtxoId::new("tx", 4);
        assert_eq!(set.get_by_id(&id).unwrap().id, id);
        assert!(set.contains(&id));
    }

    #[test]
    fn insert_overwrites_same_id() {
        let mut set = UtxoSet::new();
        set.insert(utxo("tx", 0, 10, "alice"));
        set.insert(utxo("tx", 0, 20, "bob"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("tx", 0).unwrap().amount, 20);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut set = UtxoSet::from_genesis([("alice", 10)]);
        let before = set.clone_snapshot();
        assert!(set.remove("nope", 0).is_none());
        assert_eq!(set, before);
    }

    #[test]
    fn remove_returns_record() {
        let mut set = UtxoSet::from_genesis([("alice", 10)]);
        let removed = set.remove("genesis", 0).unwrap();
        assert_eq!(removed.amount, 10);
        assert!(set.get("genesis", 0).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn owner_query_keeps_insertion_order_across_removal() {
        let mut set = UtxoSet::new();
        set.insert(utxo("a", 0, 1, "alice"));
        set.insert(utxo("b", 0, 2, "bob"));
        set.insert(utxo("c", 0, 3, "alice"));
        set.insert(utxo("d", 0, 4, "alice"));

        set.remove("a", 0);

        let amounts: Vec<u64> = set.utxos_for_owner("alice").iter().map(|u| u.amount).collect();
        assert_eq!(amounts, vec![3, 4]);

        let order: Vec<&str> = set.iter().map(|u| u.id.tx_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "d"]);
    }

    #[test]
    fn balance_sums_owned_amounts() {
        let mut set = UtxoSet::new();
        set.insert(utxo("a", 0, 100, "alice"));
        set.insert(utxo("a", 1, 50, "alice"));
        set.insert(utxo("a", 2, 7, "bob"));

        assert_eq!(set.balance("alice"), 150);
        assert_eq!(set.balance("bob"), 7);
        assert_eq!(set.balance("nobody"), 0);
        assert!(set.utxos_for_owner("nobody").is_empty());
    }

    #[test]
    fn balance_above_u64_max_does_not_overflow() {
        let mut set = UtxoSet::new();
        set.insert(utxo("a", 0, u64::MAX, "bob"));
        set.insert(utxo("b", 0, u64::MAX, "bob"));

        assert_eq!(set.balance("bob"), 2 * u64::MAX as u128);
        assert_eq!(set.balance("bob"), set.total_supply());
    }

    #[test]
    fn queries_do_not_mutate() {
        let set = UtxoSet::from_genesis([("alice", 10), ("bob", 20)]);
        let before = set.clone_snapshot();

        let _ = set.get("genesis", 0);
        let _ = set.utxos_for_owner("alice");
        let _ = set.balance("bob");
        let _ = set.state_root();

        assert_eq!(set, before);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut set = UtxoSet::from_genesis([("alice", 10)]);
        let mut snap = set.clone_snapshot();

        set.remove("genesis", 0);
        snap.insert(utxo("x", 0, 5, "bob"));

        assert!(set.get("x", 0).is_none());
        assert_eq!(snap.get("genesis", 0).unwrap().amount, 10);
        assert_eq!(set.len(), 0);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn state_root_ignores_insertion_order() {
        let mut a = UtxoSet::new();
        a.insert(utxo("t1", 0, 1, "alice"));
        a.insert(utxo("t2", 0, 2, "bob"));
        a.insert(utxo("t3", 1, 3, "carol"));

        let mut b = UtxoSet::new();
        b.insert(utxo("t3", 1, 3, "carol"));
        b.insert(utxo("t1", 0, 1, "alice"));
        b.insert(utxo("t2", 0, 2, "bob"));

        assert_eq!(a.state_root(), b.state_root());
    }

    #[test]
    fn state_root_tracks_content() {
        let a = UtxoSet::from_genesis([("alice", 10)]);
        let b = UtxoSet::from_genesis([("alice", 11)]);
        let c = UtxoSet::from_genesis([("bob", 10)]);

        assert_ne!(a.state_root(), b.state_root());
        assert_ne!(a.state_root(), c.state_root());
        assert_eq!(UtxoSet::new().state_root(), [0u8; 32]);
    }

    #[test]
    fn view_resolves_ids() {
        let set = UtxoSet::from_genesis([("alice", 10)]);
        let view: &dyn UtxoView = &set;
        assert!(view.get_utxo(&UtxoId::new("genesis", 0)).is_some());
        assert!(view.get_utxo(&UtxoId::new("genesis", 1)).is_none());
    }
}
