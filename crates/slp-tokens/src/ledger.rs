//! Ledger and key access.
//!
//! The core never talks to a node directly. Callers supply a [`TxFetcher`]
//! for provenance checks, a [`LedgerService`] for unspent listing and
//! broadcast, and a [`Keystore`] for signing.

use std::collections::HashMap;

use slp_primitives::chainhash::Hash;
use slp_primitives::ec::PrivateKey;
use slp_script::address::AddressKind;
use slp_script::Address;

use crate::error::TokenError;
use crate::types::CandidateOutput;

/// Source of raw transactions by id.
pub trait TxFetcher {
    /// Fetch the serialized transaction `txid`.
    fn fetch_raw_tx(&self, txid: &Hash) -> Result<Vec<u8>, TokenError>;
}

/// A ledger the SDK can query and broadcast to.
pub trait LedgerService: TxFetcher {
    /// Submit a serialized transaction, returning its id.
    fn broadcast_raw_tx(&self, raw_tx: &[u8]) -> Result<Hash, TokenError>;

    /// Unspent outputs controlled by the wallet.
    fn list_unspent(&self) -> Result<Vec<CandidateOutput>, TokenError>;
}

/// Signing keys by public key hash.
pub trait Keystore {
    /// The key whose public key hashes to `pub_key_hash`.
    fn private_key_for(&self, pub_key_hash: &[u8; 20]) -> Option<PrivateKey>;

    /// The key behind a P2PKH address.
    fn private_key_for_address(&self, address: &Address) -> Option<PrivateKey> {
        match address.kind() {
            AddressKind::P2PKH => self.private_key_for(address.hash()),
            AddressKind::P2SH => None,
        }
    }
}

/// An in-memory [`Keystore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryKeystore {
    keys: HashMap<[u8; 20], PrivateKey>,
}

impl MemoryKeystore {
    /// Create an empty keystore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, returning its public key hash.
    pub fn insert(&mut self, key: PrivateKey) -> [u8; 20] {
        let pkh = key.pub_key().hash160();
        self.keys.insert(pkh, key);
        pkh
    }

    /// Import a WIF-encoded key.
    pub fn import_wif(&mut self, wif: &str) -> Result<[u8; 20], TokenError> {
        Ok(self.insert(PrivateKey::from_wif(wif)?))
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Keystore for MemoryKeystore {
    fn private_key_for(&self, pub_key_hash: &[u8; 20]) -> Option<PrivateKey> {
        self.keys.get(pub_key_hash).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slp_script::Network;

    #[test]
    fn test_memory_keystore_lookup() {
        let key = PrivateKey::random();
        let mut store = MemoryKeystore::new();
        assert!(store.is_empty());
        let pkh = store.insert(key.clone());
        assert_eq!(store.len(), 1);
        assert_eq!(store.private_key_for(&pkh), Some(key.clone()));
        assert!(store.private_key_for(&[0u8; 20]).is_none());

        let addr = Address::from_public_key(&key.pub_key(), Network::Regtest);
        assert_eq!(store.private_key_for_address(&addr), Some(key));
        let p2sh = Address::from_script_hash(&pkh, Network::Regtest);
        assert!(store.private_key_for_address(&p2sh).is_none());
    }

    #[test]
    fn test_import_wif() {
        let mut store = MemoryKeystore::new();
        let pkh = store
            .import_wif("cNGwGSc7KRrTmdLUZ54fiSXWbhLNDc2Eg5zNucgQxyQCzuQ5YRDq")
            .unwrap();
        assert!(store.private_key_for(&pkh).is_some());
        assert!(store.import_wif("not-a-key").is_err());
    }
}
