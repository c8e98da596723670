//! Flow control and lock time operations.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::parsed_opcode::ParsedOpcode;
use super::scriptnum::ScriptNumber;
use super::thread::Thread;

const LOCK_TIME_THRESHOLD: i64 = 500_000_000;
const SEQUENCE_FINAL: u32 = 0xffff_ffff;
const SEQUENCE_LOCK_TIME_DISABLED: i64 = 1 << 31;
const SEQUENCE_LOCK_TIME_TYPE: i64 = 1 << 22;
const SEQUENCE_LOCK_TIME_MASK: i64 = 0x0000_ffff;

/// Lock time operands may be up to 5 bytes.
const LOCK_TIME_NUM_LEN: usize = 5;

impl<'a> Thread<'a> {
    pub(crate) fn op_if(&mut self, negate: bool) -> Result<(), InterpreterError> {
        let mut value = false;
        if self.is_branch_executing() {
            value = self.dstack.pop_bool()? != negate;
        }
        self.exec_stack.push(value);
        Ok(())
    }

    pub(crate) fn op_else(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        match self.exec_stack.last_mut() {
            Some(top) => {
                *top = !*top;
                Ok(())
            }
            None => Err(unbalanced(pop)),
        }
    }

    pub(crate) fn op_endif(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        self.exec_stack.pop().map(|_| ()).ok_or_else(|| unbalanced(pop))
    }

    fn peek_lock_time(&self) -> Result<i64, InterpreterError> {
        let minimal = self.has_flag(ScriptFlags::VERIFY_MINIMAL_DATA);
        let n = ScriptNumber::from_bytes(self.dstack.peek(0)?, LOCK_TIME_NUM_LEN, minimal)?;
        let v = n.to_i64();
        if v < 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NegativeLockTime,
                format!("negative lock time: {}", v),
            ));
        }
        Ok(v)
    }

    pub(crate) fn op_check_locktime_verify(&mut self) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::VERIFY_CHECKLOCKTIMEVERIFY) {
            return Ok(());
        }
        let ctx = self.require_context("OP_CHECKLOCKTIMEVERIFY")?;
        let required = self.peek_lock_time()?;
        let tx_lock_time = ctx.lock_time() as i64;

        let same_kind = (required < LOCK_TIME_THRESHOLD) == (tx_lock_time < LOCK_TIME_THRESHOLD);
        if !same_kind || required > tx_lock_time {
            return Err(unsatisfied(format!(
                "locktime requirement not satisfied: required {}, transaction {}",
                required, tx_lock_time
            )));
        }
        if ctx.input_sequence(self.input_idx) == SEQUENCE_FINAL {
            return Err(unsatisfied("transaction input is finalized".to_string()));
        }
        Ok(())
    }

    pub(crate) fn op_check_sequence_verify(&mut self) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::VERIFY_CHECKSEQUENCEVERIFY) {
            return Ok(());
        }
        let ctx = self.require_context("OP_CHECKSEQUENCEVERIFY")?;
        let stack_sequence = self.peek_lock_time()?;
        if stack_sequence & SEQUENCE_LOCK_TIME_DISABLED != 0 {
            return Ok(());
        }
        if ctx.tx_version() < 2 {
            return Err(unsatisfied(format!(
                "invalid transaction version {} for sequence lock",
                ctx.tx_version()
            )));
        }
        let tx_sequence = ctx.input_sequence(self.input_idx) as i64;
        if tx_sequence & SEQUENCE_LOCK_TIME_DISABLED != 0 {
            return Err(unsatisfied("transaction sequence has the disable bit set".to_string()));
        }

        let mask = SEQUENCE_LOCK_TIME_TYPE | SEQUENCE_LOCK_TIME_MASK;
        let required = stack_sequence & mask;
        let actual = tx_sequence & mask;
        let same_kind = (required & SEQUENCE_LOCK_TIME_TYPE) == (actual & SEQUENCE_LOCK_TIME_TYPE);
        if !same_kind || required > actual {
            return Err(unsatisfied(format!(
                "sequence requirement not satisfied: required {}, input {}",
                required, actual
            )));
        }
        Ok(())
    }
}

fn unbalanced(pop: &ParsedOpcode) -> InterpreterError {
    InterpreterError::new(
        InterpreterErrorCode::UnbalancedConditional,
        format!("{} with no matching opcode to begin conditional execution", pop.name()),
    )
}

fn unsatisfied(description: String) -> InterpreterError {
    InterpreterError::new(InterpreterErrorCode::UnsatisfiedLockTime, description)
}
