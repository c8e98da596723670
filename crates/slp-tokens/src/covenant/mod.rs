//! Mint vault covenant.
//!
//! A [`MintVault`] is a P2SH contract that holds a token's mint authority.
//! Whoever holds the authorized key can spend it, but only into a MINT of
//! the pinned token whose authority output pays back into the same vault.
//! The redeem script checks this by rebuilding outputs 0 to 2 from the
//! pushed quantity and receiver hash and comparing their hash with the
//! `hashOutputs` field of a sighash preimage it authenticates with
//! `OP_CHECKDATASIG`.
//!
//! [`build_unlock`] produces the scriptSig pushes in the order fixed by the
//! vault's [`UnlockSchema`].

mod schema;
mod unlock;
mod v0;

pub use schema::{Slot, SlotKind, SlotWidth, UnlockFields, UnlockSchema};
pub use unlock::{apply_unlocks, build_unlock, UnlockDescriptor};
pub use v0::VaultCompilerV0;

use slp_primitives::ec::PublicKey;
use slp_primitives::hash::hash160;
use slp_script::{Address, Network, Script};

use crate::builder::AUTHORITY_VOUT;
use crate::error::TokenError;
use crate::token_id::TokenId;

/// Parameters pinned into a vault's redeem script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultParams {
    /// Key that must sign every spend.
    pub authorized_key: PublicKey,
    /// Token whose authority the vault holds.
    pub token_id: TokenId,
    /// Authority vout the MINT record must name.
    ///
    /// Version 0 vaults rebuild the authority output at index 2 and only
    /// compile with [`AUTHORITY_VOUT`]. Any other value is rejected with
    /// [`TokenError::InvalidInput`].
    pub authority_vout: u8,
}

impl VaultParams {
    /// Vault parameters using the builders' authority vout
    /// ([`AUTHORITY_VOUT`]), the only one version 0 vaults accept.
    pub fn new(authorized_key: PublicKey, token_id: TokenId) -> Self {
        VaultParams { authorized_key, token_id, authority_vout: AUTHORITY_VOUT }
    }
}

/// Compiles vault parameters into a redeem script.
pub trait CovenantCompiler {
    /// Compile `params` into a vault.
    fn compile(&self, params: &VaultParams) -> Result<MintVault, TokenError>;
}

/// A compiled mint vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintVault {
    params: VaultParams,
    redeem_script: Script,
    script_hash: [u8; 20],
    schema: UnlockSchema,
}

impl MintVault {
    /// Compile a vault with the current script version.
    pub fn new(params: VaultParams) -> Result<Self, TokenError> {
        VaultCompilerV0.compile(&params)
    }

    /// Wrap a redeem script produced by a [`CovenantCompiler`].
    pub fn from_compiled(params: VaultParams, redeem_script: Script, schema: UnlockSchema) -> Self {
        let script_hash = hash160(redeem_script.to_bytes());
        MintVault { params, redeem_script, script_hash, schema }
    }

    /// The pinned parameters.
    pub fn params(&self) -> &VaultParams {
        &self.params
    }

    /// The redeem script, pushed last in every unlocking script.
    pub fn redeem_script(&self) -> &Script {
        &self.redeem_script
    }

    /// Hash160 of the redeem script.
    pub fn script_hash(&self) -> &[u8; 20] {
        &self.script_hash
    }

    /// Stack layout the redeem script expects.
    pub fn schema(&self) -> UnlockSchema {
        self.schema
    }

    /// P2SH address of the vault.
    pub fn address(&self, network: Network) -> Address {
        Address::from_script_hash(&self.script_hash, network)
    }

    /// P2SH locking script of the vault.
    pub fn locking_script(&self) -> Script {
        Script::new_p2sh(&self.script_hash)
    }

    /// `true` if `script` locks funds into this vault.
    pub fn is_locking_script(&self, script: &Script) -> bool {
        script.script_hash() == Some(self.script_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slp_primitives::ec::PrivateKey;

    const TOKEN: &str = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98";

    fn params() -> VaultParams {
        let key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        VaultParams::new(key.pub_key(), TokenId::from_hex(TOKEN).unwrap())
    }

    #[test]
    fn test_vault_is_deterministic() {
        let a = MintVault::new(params()).unwrap();
        let b = MintVault::new(params()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.schema(), UnlockSchema::V0);
        assert_eq!(*a.script_hash(), hash160(a.redeem_script().to_bytes()));
        assert!(a.is_locking_script(&a.locking_script()));
        assert!(a.locking_script().is_p2sh());
    }

    #[test]
    fn test_params_change_the_vault() {
        let base = MintVault::new(params()).unwrap();
        let mut other_token = params();
        other_token.token_id = TokenId::from_txid(slp_primitives::chainhash::Hash::new([1; 32]));
        let mut other_key = params();
        other_key.authorized_key = PrivateKey::random().pub_key();
        for p in [other_token, other_key] {
            let vault = MintVault::new(p).unwrap();
            assert_ne!(vault.script_hash(), base.script_hash());
            assert!(!base.is_locking_script(&vault.locking_script()));
        }
    }

    #[test]
    fn test_vault_address_roundtrip() {
        let vault = MintVault::new(params()).unwrap();
        let addr = vault.address(Network::Regtest);
        assert!(addr.to_cash_string().starts_with("bchreg:p"));
        let parsed = Address::from_string(&addr.to_slp_string()).unwrap();
        assert_eq!(parsed.hash(), vault.script_hash());
        assert_eq!(addr.locking_script(), vault.locking_script());
    }

    #[test]
    fn test_rejects_other_authority_vouts() {
        let mut p = params();
        p.authority_vout = 1;
        assert!(matches!(MintVault::new(p), Err(TokenError::InvalidInput(_))));
        p.authority_vout = 3;
        assert!(matches!(MintVault::new(p), Err(TokenError::InvalidInput(_))));
        p.authority_vout = AUTHORITY_VOUT;
        assert!(MintVault::new(p).is_ok());
    }
}
