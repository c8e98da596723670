//! Vault unlock descriptors.

use tracing::debug;

use slp_primitives::ec::PrivateKey;
use slp_primitives::hash::sha256d;
use slp_script::Script;
use slp_transaction::sighash::{calc_preimage_parts, SIGHASH_ALL_FORKID};
use slp_transaction::template::p2sh;
use slp_transaction::Transaction;

use super::schema::{UnlockFields, UnlockSchema};
use crate::error::TokenError;
use crate::metadata::TokenRecord;

/// The scriptSig for one vault input, as pushes plus the redeem script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockDescriptor {
    /// Input the descriptor unlocks.
    pub input_index: usize,
    /// Redeem script, pushed last.
    pub locking_script: Script,
    /// Pushes in scriptSig order.
    pub pushes: Vec<Vec<u8>>,
}

impl UnlockDescriptor {
    /// Assemble the scriptSig.
    pub fn unlocking_script(&self) -> Result<Script, TokenError> {
        Ok(p2sh::unlocking_script(&self.pushes, &self.locking_script)?)
    }
}

/// Build the unlock for vault input `input_index` of `unsigned_tx`.
///
/// `locking_script` is the vault's redeem script and `input_value` the
/// satoshis of the spent vault output. The signature commits to every
/// output, so the transaction must be final apart from its scriptSigs.
pub fn build_unlock(
    unsigned_tx: &Transaction,
    input_index: usize,
    input_value: u64,
    locking_script: &Script,
    signing_key: &PrivateKey,
) -> Result<UnlockDescriptor, TokenError> {
    if input_index >= unsigned_tx.inputs.len() {
        return Err(TokenError::InvalidInput(format!(
            "input index {} out of range ({} inputs)",
            input_index,
            unsigned_tx.inputs.len()
        )));
    }
    let outputs = &unsigned_tx.outputs;
    if outputs.len() < 3 {
        return Err(TokenError::UnlockLayout(format!(
            "vault spend needs metadata, receiver and authority outputs, found {} outputs",
            outputs.len()
        )));
    }

    let quantity = match TokenRecord::from_script(&outputs[0].locking_script)? {
        TokenRecord::Mint(mint) => mint.quantity,
        other => {
            return Err(TokenError::UnlockLayout(format!(
                "output 0 carries a {:?} record, expected MINT",
                other.kind()
            )))
        }
    };
    let receiver_hash = outputs[1].locking_script.public_key_hash().ok_or_else(|| {
        TokenError::UnlockLayout("output 1 must pay to a public key hash".into())
    })?;
    let trailing_outputs: Vec<u8> = outputs[3..].iter().flat_map(|o| o.to_bytes()).collect();

    let preimage = calc_preimage_parts(
        unsigned_tx,
        input_index,
        locking_script.to_bytes(),
        SIGHASH_ALL_FORKID,
        input_value,
    )?;
    let digest = sha256d(&preimage.to_bytes());
    let mut signature = signing_key.sign(&digest)?.to_der();
    signature.push(SIGHASH_ALL_FORKID as u8);

    let fields = UnlockFields {
        signature,
        preimage,
        quantity: quantity.to_be_bytes(),
        receiver_hash,
        trailing_outputs,
    };
    let pushes = UnlockSchema::V0.assemble(&fields)?;
    debug!(input_index, quantity, pushes = pushes.len(), "built vault unlock");

    Ok(UnlockDescriptor {
        input_index,
        locking_script: locking_script.clone(),
        pushes,
    })
}

/// Place each descriptor's scriptSig on a copy of `tx`.
///
/// Fails without returning a partial result if any descriptor is invalid.
pub fn apply_unlocks(
    tx: &Transaction,
    descriptors: &[UnlockDescriptor],
) -> Result<Transaction, TokenError> {
    let mut unlocked = tx.clone();
    for descriptor in descriptors {
        let script = descriptor.unlocking_script()?;
        let input = unlocked.inputs.get_mut(descriptor.input_index).ok_or_else(|| {
            TokenError::InvalidInput(format!(
                "descriptor for input {} but transaction has {} inputs",
                descriptor.input_index,
                tx.inputs.len()
            ))
        })?;
        input.unlocking_script = Some(script);
    }
    Ok(unlocked)
}
