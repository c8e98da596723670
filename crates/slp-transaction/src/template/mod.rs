//! Script templates for common transaction types.
//!
//! Provides the `UnlockingScriptTemplate` trait with a P2PKH implementation,
//! and P2SH helpers that assemble a scriptSig from pushes and a redeem
//! script.

pub mod p2pkh;
pub mod p2sh;

use slp_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Trait for script templates that produce unlocking scripts.
pub trait UnlockingScriptTemplate {
    /// Produce an unlocking script for the given input.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError>;

    /// Estimate the byte length of the unlocking script, for fee
    /// calculation before signing.
    fn estimate_length(&self, tx: &Transaction, input_index: usize) -> usize;
}
