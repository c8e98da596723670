//! Interpreter transaction context.
//!
//! Connects the script interpreter to a [`Transaction`] so `OP_CHECKSIG`
//! can compute the FORKID sighash of the input being verified.

use slp_primitives::ec::{PublicKey, Signature};
use slp_script::interpreter::{InterpreterError, InterpreterErrorCode, TxContext};
use slp_script::Script;

use crate::sighash;
use crate::transaction::Transaction;

/// [`TxContext`] over a transaction whose inputs carry their spent outputs.
pub struct TxVerifyContext<'a> {
    tx: &'a Transaction,
}

impl<'a> TxVerifyContext<'a> {
    /// Wrap `tx`.
    pub fn new(tx: &'a Transaction) -> Self {
        TxVerifyContext { tx }
    }
}

impl TxContext for TxVerifyContext<'_> {
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
        sighash_flag: u32,
    ) -> Result<bool, InterpreterError> {
        let Some((_, der)) = full_sig.split_last() else {
            return Ok(false);
        };
        let (Ok(sig), Ok(pk)) = (Signature::from_der(der), PublicKey::from_bytes(pub_key)) else {
            return Ok(false);
        };

        let satoshis = self
            .tx
            .inputs
            .get(input_idx)
            .and_then(|input| input.source_tx_satoshis())
            .ok_or_else(|| {
                InterpreterError::new(
                    InterpreterErrorCode::InvalidParams,
                    format!("missing source output on input {}", input_idx),
                )
            })?;

        let digest = sighash::signature_hash(
            self.tx,
            input_idx,
            sub_script.to_bytes(),
            sighash_flag,
            satoshis,
        )
        .map_err(|e| InterpreterError::new(InterpreterErrorCode::InvalidParams, e.to_string()))?;

        Ok(pk.verify(&digest, &sig))
    }

    fn lock_time(&self) -> u32 {
        self.tx.lock_time
    }

    fn tx_version(&self) -> u32 {
        self.tx.version
    }

    fn input_sequence(&self, input_idx: usize) -> u32 {
        self.tx
            .inputs
            .get(input_idx)
            .map_or(0, |input| input.sequence_number)
    }
}
