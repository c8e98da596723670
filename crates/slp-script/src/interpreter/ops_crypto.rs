//! Hashing and signature checking operations.

use sha1::{Digest, Sha1};
use slp_primitives::ec::{PublicKey, Signature};
use slp_primitives::hash::{hash160, ripemd160, sha256, sha256d};

use crate::opcodes::*;
use crate::Script;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::parsed_opcode::unparse;
use super::thread::Thread;
use super::TxContext;

const SIGHASH_ANYONECANPAY: u32 = 0x80;
const SIGHASH_FORKID: u32 = 0x40;

impl<'a> Thread<'a> {
    /// Borrow the transaction context an opcode needs.
    pub(crate) fn require_context(&self, op: &str) -> Result<&'a dyn TxContext, InterpreterError> {
        self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidParams,
                format!("{} requires a transaction context", op),
            )
        })
    }

    /// The part of the running script after the last `OP_CODESEPARATOR`.
    pub(crate) fn sub_script(&self) -> Script {
        let start = self.last_code_sep.map_or(0, |i| i + 1);
        unparse(&self.script[start..])
    }

    pub(crate) fn op_hash(&mut self, opcode: u8) -> Result<(), InterpreterError> {
        let v = self.dstack.pop()?;
        let digest = match opcode {
            OP_RIPEMD160 => ripemd160(&v).to_vec(),
            OP_SHA1 => Sha1::digest(&v).to_vec(),
            OP_SHA256 => sha256(&v).to_vec(),
            OP_HASH160 => hash160(&v).to_vec(),
            _ => sha256d(&v).to_vec(),
        };
        self.dstack.push(digest);
        Ok(())
    }

    pub(crate) fn op_checksig(&mut self) -> Result<(), InterpreterError> {
        let pk_bytes = self.dstack.pop()?;
        let full_sig = self.dstack.pop()?;

        let Some((&hash_type, sig_bytes)) = full_sig.split_last() else {
            self.dstack.push_bool(false);
            return Ok(());
        };
        let shf = hash_type as u32;
        self.check_hash_type(shf)?;
        self.check_signature_encoding(sig_bytes)?;
        self.check_pub_key_encoding(&pk_bytes)?;

        let ctx = self.require_context("OP_CHECKSIG")?;
        let sub_script = self.sub_script();
        let ok = ctx.verify_signature(&full_sig, &pk_bytes, &sub_script, self.input_idx, shf)?;
        self.check_null_fail(ok, &full_sig)?;
        self.dstack.push_bool(ok);
        Ok(())
    }

    pub(crate) fn op_checkdatasig(&mut self) -> Result<(), InterpreterError> {
        let pk_bytes = self.dstack.pop()?;
        let msg = self.dstack.pop()?;
        let sig_bytes = self.dstack.pop()?;

        if sig_bytes.is_empty() {
            self.dstack.push_bool(false);
            return Ok(());
        }
        self.check_signature_encoding(&sig_bytes)?;
        self.check_pub_key_encoding(&pk_bytes)?;

        let ok = match (Signature::from_der(&sig_bytes), PublicKey::from_bytes(&pk_bytes)) {
            (Ok(sig), Ok(pk)) => pk.verify(&sha256(&msg), &sig),
            _ => false,
        };
        self.check_null_fail(ok, &sig_bytes)?;
        self.dstack.push_bool(ok);
        Ok(())
    }

    fn check_hash_type(&self, shf: u32) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::VERIFY_STRICT_ENCODING) {
            return Ok(());
        }
        let base = shf & !(SIGHASH_ANYONECANPAY | SIGHASH_FORKID);
        if !(1..=3).contains(&base) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidSigHashType,
                format!("invalid hash type 0x{:x}", shf),
            ));
        }
        if self.has_flag(ScriptFlags::ENABLE_SIGHASH_FORKID) && shf & SIGHASH_FORKID == 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::MissingForkId,
                "signature hash type is missing the fork id",
            ));
        }
        Ok(())
    }

    fn check_signature_encoding(&self, sig: &[u8]) -> Result<(), InterpreterError> {
        let strict = self.has_flag(ScriptFlags::VERIFY_STRICT_ENCODING)
            || self.has_flag(ScriptFlags::VERIFY_DER_SIGNATURES);
        let low_s = self.has_flag(ScriptFlags::VERIFY_LOW_S);
        if !strict && !low_s {
            return Ok(());
        }
        let parsed = Signature::from_der(sig).map_err(|e| {
            InterpreterError::new(InterpreterErrorCode::SigDer, e.to_string())
        })?;
        if low_s && !parsed.is_low_s() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::SigHighS,
                "signature is not canonical due to unnecessarily high S value",
            ));
        }
        Ok(())
    }

    fn check_pub_key_encoding(&self, pk: &[u8]) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::VERIFY_STRICT_ENCODING) {
            return Ok(());
        }
        PublicKey::from_bytes(pk)
            .map(|_| ())
            .map_err(|e| InterpreterError::new(InterpreterErrorCode::PubKeyType, e.to_string()))
    }

    fn check_null_fail(&self, ok: bool, sig: &[u8]) -> Result<(), InterpreterError> {
        if !ok && !sig.is_empty() && self.has_flag(ScriptFlags::VERIFY_NULL_FAIL) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NullFail,
                "signature not empty on failed checksig",
            ));
        }
        Ok(())
    }
}
