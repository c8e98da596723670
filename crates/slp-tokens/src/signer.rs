//! P2PKH input signing.

use tracing::debug;

use slp_transaction::template::p2pkh;
use slp_transaction::template::UnlockingScriptTemplate;
use slp_transaction::Transaction;

use crate::error::TokenError;
use crate::ledger::Keystore;

/// Sign every P2PKH input of `tx` whose key `keystore` holds.
///
/// Returns a signed copy. Other inputs, vault inputs included, are left
/// as they are for [`apply_unlocks`](crate::covenant::apply_unlocks).
/// FORKID signatures do not commit to other inputs' scriptSigs, so the two
/// can be applied in either order.
pub fn sign_p2pkh_inputs(tx: &Transaction, keystore: &dyn Keystore) -> Result<Transaction, TokenError> {
    let mut signed = tx.clone();
    let mut count = 0usize;

    for (index, input) in tx.inputs.iter().enumerate() {
        let script = input.source_tx_script().ok_or_else(|| {
            TokenError::InvalidInput(format!("input {} has no source output", index))
        })?;
        let Some(pkh) = script.public_key_hash() else {
            continue;
        };
        let Some(key) = keystore.private_key_for(&pkh) else {
            debug!(index, pkh = %hex::encode(pkh), "no key for P2PKH input");
            continue;
        };
        let unlocking = p2pkh::unlock(key, None).sign(tx, index)?;
        signed.inputs[index].unlocking_script = Some(unlocking);
        count += 1;
    }

    debug!(signed = count, inputs = tx.inputs.len(), "signed P2PKH inputs");
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryKeystore;
    use crate::types::CandidateOutput;
    use slp_primitives::chainhash::Hash;
    use slp_primitives::ec::PrivateKey;
    use slp_script::interpreter::ScriptFlags;
    use slp_script::Script;
    use slp_transaction::TransactionOutput;

    #[test]
    fn test_signs_only_known_p2pkh_inputs() {
        let key = PrivateKey::random();
        let mut keystore = MemoryKeystore::new();
        let pkh = keystore.insert(key);

        let mut tx = Transaction::new();
        tx.add_input(CandidateOutput::new(Hash::new([1; 32]), 0, 10_000, Script::new_p2pkh(&pkh)).to_input());
        tx.add_input(CandidateOutput::new(Hash::new([2; 32]), 0, 10_000, Script::new_p2pkh(&[9; 20])).to_input());
        tx.add_input(CandidateOutput::new(Hash::new([3; 32]), 0, 546, Script::new_p2sh(&[8; 20])).to_input());
        tx.add_output(TransactionOutput::new(19_000, Script::new_p2pkh(&pkh)));

        let signed = sign_p2pkh_inputs(&tx, &keystore).unwrap();
        assert!(signed.inputs[0].unlocking_script.is_some());
        assert!(signed.inputs[1].unlocking_script.is_none());
        assert!(signed.inputs[2].unlocking_script.is_none());
        assert!(tx.inputs[0].unlocking_script.is_none());
        signed.verify_input(0, ScriptFlags::STANDARD).unwrap();
    }

    #[test]
    fn test_requires_source_outputs() {
        let mut tx = Transaction::new();
        tx.add_input(slp_transaction::TransactionInput::new());
        assert!(matches!(
            sign_p2pkh_inputs(&tx, &MemoryKeystore::new()),
            Err(TokenError::InvalidInput(_))
        ));
    }
}
