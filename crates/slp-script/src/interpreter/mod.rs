//! Bitcoin Cash script interpreter.
//!
//! Evaluates an unlocking script against a locking script, including BIP16
//! pay-to-script-hash redemption, so covenant spends can be checked before
//! they are broadcast. Splice opcodes (`OP_CAT`, `OP_SPLIT`) and
//! `OP_CHECKDATASIG` are enabled; `OP_CHECKMULTISIG` is not evaluated.
//!
//! The interpreter does not depend on the transaction crate. Callers supply a
//! [`TxContext`] that computes sighashes and verifies signatures.
//!
//! # Example
//!
//! ```ignore
//! use slp_script::interpreter::{Engine, ScriptFlags};
//!
//! Engine::new().execute(&unlocking, &locking, ScriptFlags::STANDARD, Some(&ctx), 0)?;
//! ```

pub mod error;
pub mod flags;
pub mod limits;
pub mod parsed_opcode;
pub mod scriptnum;
pub mod stack;
pub mod thread;

mod ops_arithmetic;
mod ops_crypto;
mod ops_data;
mod ops_flow;

pub use error::{InterpreterError, InterpreterErrorCode};
pub use flags::ScriptFlags;
pub use limits::Limits;
pub use parsed_opcode::{ParsedOpcode, ParsedScript};
pub use scriptnum::ScriptNumber;
pub use stack::Stack;

use crate::Script;
use thread::Thread;

/// Transaction data needed by signature and lock time opcodes.
pub trait TxContext {
    /// Verify `full_sig` (DER signature plus sighash byte) by `pub_key` over
    /// the sighash of input `input_idx` with `sub_script` as scriptCode.
    ///
    /// Returns `Ok(false)` for a well-formed but invalid signature.
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
        sighash_flag: u32,
    ) -> Result<bool, InterpreterError>;

    /// Transaction lock time.
    fn lock_time(&self) -> u32;

    /// Transaction version.
    fn tx_version(&self) -> u32;

    /// Sequence number of input `input_idx`.
    fn input_sequence(&self, input_idx: usize) -> u32;
}

/// The script execution engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    limits: Limits,
}

impl Engine {
    /// Engine with default [`Limits`].
    pub fn new() -> Self {
        Engine::default()
    }

    /// Engine with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Engine { limits }
    }

    /// Execute unlocking + locking scripts for input `input_idx`.
    pub fn execute(
        &self,
        unlocking_script: &Script,
        locking_script: &Script,
        flags: ScriptFlags,
        tx_context: Option<&dyn TxContext>,
        input_idx: usize,
    ) -> Result<(), InterpreterError> {
        let mut thread = Thread::new(self.limits, flags, tx_context, input_idx)?;
        thread.verify(unlocking_script, locking_script)
    }
}
