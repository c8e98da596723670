//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Creates standard P2PKH locking scripts (`OP_DUP OP_HASH160 <hash>
//! OP_EQUALVERIFY OP_CHECKSIG`) and unlocking scripts (`<sig> <pubkey>`).

use slp_primitives::ec::PrivateKey;
use slp_script::address::AddressKind;
use slp_script::{Address, Script, ScriptError};

use crate::sighash::SIGHASH_ALL_FORKID;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Typical scriptSig size: push(72-byte sig) + push(33-byte key).
pub const UNLOCKING_SCRIPT_LEN: usize = 107;

/// Create a P2PKH locking script from an address.
///
/// Fails for P2SH addresses.
pub fn lock(address: &Address) -> Result<Script, TransactionError> {
    if address.kind() != AddressKind::P2PKH {
        return Err(ScriptError::UnsupportedAddress(format!(
            "{} is not a P2PKH address",
            address
        ))
        .into());
    }
    Ok(Script::new_p2pkh(address.hash()))
}

/// Create a P2PKH unlocker. The sighash flag defaults to `SIGHASH_ALL_FORKID`.
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2PKH {
    P2PKH {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL_FORKID),
    }
}

/// P2PKH signing template holding a private key and sighash flag.
pub struct P2PKH {
    private_key: PrivateKey,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2PKH {
    /// Sign the input and return `<DER_sig || sighash_byte> <compressed_pubkey>`.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError> {
        let sig_hash = tx.calc_input_signature_hash(input_index, self.sighash_flag)?;
        let signature = self.private_key.sign(&sig_hash)?;

        let mut sig_buf = signature.to_der();
        sig_buf.push(self.sighash_flag as u8);

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        script.append_push_data(&self.private_key.pub_key().to_compressed())?;
        Ok(script)
    }

    fn estimate_length(&self, _tx: &Transaction, _input_index: usize) -> usize {
        UNLOCKING_SCRIPT_LEN
    }
}
